//! The sign-up page and the handler that creates a user across Appwrite and Dwolla.

use std::{collections::HashMap, sync::Arc};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, macros::format_description};

use crate::{
    AppState, Error,
    appwrite::{Appwrite, Collection, Session, UNIQUE_ID},
    auth::{
        cookie::set_auth_cookie,
        user::{NewUser, create_user},
    },
    dwolla::{Dwolla, NewCustomer, extract_customer_id_from_url},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, auth_layout, base, loading_spinner, password_input,
        text_input,
    },
};

const PASSWORD_MIN_LENGTH: u8 = 8;

/// Field name to error message.
type FormErrors = HashMap<&'static str, &'static str>;

/// The data entered by the user in the sign-up form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignUpData {
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The first line of the street address.
    pub address1: String,
    /// The city of the address.
    pub city: String,
    /// Two letter state code, e.g. "NY".
    pub state: String,
    /// The postal code of the address.
    pub postal_code: String,
    /// Formatted as "yyyy-mm-dd".
    pub date_of_birth: String,
    /// The social security number.
    pub ssn: String,
    /// The email the user will sign in with.
    pub email: String,
    /// The password the user will sign in with.
    pub password: String,
}

impl SignUpData {
    /// Check the fields, returning the error message for each invalid field.
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        let char_count = |value: &str| value.trim().chars().count();

        if char_count(&self.first_name) < 3 {
            errors.insert("first_name", "First name must be at least 3 characters.");
        }

        if char_count(&self.last_name) < 3 {
            errors.insert("last_name", "Last name must be at least 3 characters.");
        }

        if !(1..=50).contains(&char_count(&self.address1)) {
            errors.insert("address1", "Address must be between 1 and 50 characters.");
        }

        if !(1..=50).contains(&char_count(&self.city)) {
            errors.insert("city", "City must be between 1 and 50 characters.");
        }

        if char_count(&self.state) != 2 {
            errors.insert("state", "State must be a two letter code, e.g. NY.");
        }

        if !(3..=6).contains(&char_count(&self.postal_code)) {
            errors.insert("postal_code", "Postal code must be between 3 and 6 characters.");
        }

        if Date::parse(
            self.date_of_birth.trim(),
            format_description!("[year]-[month]-[day]"),
        )
        .is_err()
        {
            errors.insert("date_of_birth", "Date of birth must be in the form yyyy-mm-dd.");
        }

        if char_count(&self.ssn) < 3 {
            errors.insert("ssn", "SSN must be at least 3 characters.");
        }

        if !EmailAddress::is_valid(self.email.trim()) {
            errors.insert("email", "Enter a valid email address.");
        }

        if self.password.chars().count() < PASSWORD_MIN_LENGTH as usize {
            errors.insert("password", "Password must be at least 8 characters.");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    fn to_customer(&self) -> NewCustomer {
        NewCustomer {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            customer_type: "personal".to_owned(),
            address1: self.address1.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_uppercase(),
            postal_code: self.postal_code.trim().to_owned(),
            date_of_birth: self.date_of_birth.trim().to_owned(),
            ssn: self.ssn.trim().to_owned(),
        }
    }
}

fn sign_up_form(data: &SignUpData, errors: &FormErrors) -> Markup {
    let error = |field: &str| errors.get(field).copied();

    html! {
        form
            hx-post=(endpoints::SIGN_UP_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            div class="flex gap-4"
            {
                (text_input("first_name", "First Name", "text", "Enter your first name", &data.first_name, error("first_name")))
                (text_input("last_name", "Last Name", "text", "Enter your last name", &data.last_name, error("last_name")))
            }

            (text_input("address1", "Address", "text", "Enter your specific address", &data.address1, error("address1")))
            (text_input("city", "City", "text", "Enter your city", &data.city, error("city")))

            div class="flex gap-4"
            {
                (text_input("state", "State", "text", "Example: NY", &data.state, error("state")))
                (text_input("postal_code", "Postal Code", "text", "Example: 11101", &data.postal_code, error("postal_code")))
            }

            div class="flex gap-4"
            {
                (text_input("date_of_birth", "Date of Birth", "text", "yyyy-mm-dd", &data.date_of_birth, error("date_of_birth")))
                (text_input("ssn", "SSN", "text", "Example: 1234", &data.ssn, error("ssn")))
            }

            (text_input("email", "Email", "email", "Enter your email", &data.email, error("email")))
            (password_input("", PASSWORD_MIN_LENGTH, error("password")))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Sign up"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                a href=(endpoints::SIGN_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                    "Sign in"
                }
            }
        }
    }
}

/// Display the sign-up page.
pub async fn get_sign_up_page() -> Response {
    let form = sign_up_form(&SignUpData::default(), &FormErrors::new());
    let content = auth_layout("Sign up", "Please enter your details", &form);

    base("Sign Up", &[], &content).into_response()
}

/// The state needed to sign up a user.
#[derive(Clone)]
pub struct SignUpState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// Creates the account, profile and session.
    pub appwrite: Arc<dyn Appwrite>,
    /// Creates the customer that owns the user's funding sources.
    pub dwolla: Arc<dyn Dwolla>,
}

impl FromRef<AppState> for SignUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            appwrite: state.appwrite.clone(),
            dwolla: state.dwolla.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignUpState> for Key {
    fn from_ref(state: &SignUpState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create the Appwrite account, Dwolla customer and user profile, then sign the user in.
///
/// If any step after creating the account fails, the account is deleted so
/// the user can try again with the same email.
pub async fn sign_up(state: &SignUpState, data: &SignUpData) -> Result<Session, Error> {
    let email = data.email.trim();
    let account = state
        .appwrite
        .create_account(UNIQUE_ID, email, &data.password, &data.full_name())
        .await?;

    match complete_sign_up(state, data, &account.id).await {
        Ok(session) => Ok(session),
        Err(error) => {
            tracing::error!(
                "Sign-up failed after creating account {}: {error}. Deleting the account.",
                account.id
            );

            if let Err(delete_error) = state.appwrite.delete_user(&account.id).await {
                tracing::error!("Could not delete account {}: {delete_error}", account.id);
            }

            Err(error)
        }
    }
}

async fn complete_sign_up(
    state: &SignUpState,
    data: &SignUpData,
    user_id: &str,
) -> Result<Session, Error> {
    let customer = data.to_customer();
    let customer_url = state.dwolla.create_customer(&customer).await?;
    let customer_id = extract_customer_id_from_url(&customer_url);

    let new_user = NewUser {
        user_id: user_id.to_owned(),
        email: customer.email.clone(),
        first_name: customer.first_name,
        last_name: customer.last_name,
        address1: customer.address1,
        city: customer.city,
        state: customer.state,
        postal_code: customer.postal_code,
        date_of_birth: customer.date_of_birth,
        ssn: customer.ssn,
        dwolla_customer_id: customer_id.to_owned(),
        dwolla_customer_url: customer_url.clone(),
    };
    let user = create_user(state.appwrite.as_ref(), &new_user).await?;

    match state
        .appwrite
        .create_email_password_session(&customer.email, &data.password)
        .await
    {
        Ok(session) => Ok(session),
        Err(error) => {
            if let Err(delete_error) = state
                .appwrite
                .delete_document(Collection::Users, &user.id)
                .await
            {
                tracing::error!("Could not delete user profile {}: {delete_error}", user.id);
            }

            Err(error)
        }
    }
}

/// Handler for sign-up requests via the POST method.
///
/// On success the session cookie is set and the client is redirected to the
/// page for linking a bank. Invalid fields are shown next to the inputs.
pub async fn post_sign_up(
    State(state): State<SignUpState>,
    jar: PrivateCookieJar,
    Form(data): Form<SignUpData>,
) -> Response {
    if let Err(errors) = data.validate() {
        return sign_up_form(&data, &errors).into_response();
    }

    let session = match sign_up(&state, &data).await {
        Ok(session) => session,
        Err(Error::DuplicateEmail) => {
            let errors = FormErrors::from([(
                "email",
                "An account with this email already exists. Sign in instead.",
            )]);
            return sign_up_form(&data, &errors).into_response();
        }
        Err(error) => return error.into_alert_response(),
    };

    match set_auth_cookie(jar, &session, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::LINK_BANK_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}
