//! Defines the endpoint for sending money from one of the user's banks to
//! another user's bank.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    Error,
    account::get_accounts,
    auth::{Token, User, get_logged_in_user},
    bank::{get_bank, get_bank_by_account_id},
    endpoints,
    shareable_id::decode_shareable_id,
    transaction::{NewTransfer, TransferRecord, create_transaction},
    transfer::{
        form::{FormErrors, TransferForm, ValidTransfer, is_whole_cents, transfer_form},
        page::TransferState,
    },
};

/// Move the money with Dwolla and record the transfer.
///
/// # Errors
///
/// Returns:
/// - [Error::SourceBankNotFound] if the source bank does not exist or does not
///   belong to `user`,
/// - [Error::NotFound] if no bank has the recipient's account,
/// - [Error::InvalidShareableId] if the shareable ID cannot be decoded,
/// - [Error::InvalidAmount] if the amount is not a positive whole number of cents,
/// - or the error of whichever API call failed.
pub async fn create_transfer(
    state: &TransferState,
    user: &User,
    transfer: &ValidTransfer,
) -> Result<TransferRecord, Error> {
    if !(transfer.amount.is_finite() && transfer.amount > 0.0 && is_whole_cents(transfer.amount)) {
        return Err(Error::InvalidAmount(transfer.amount.to_string()));
    }

    let sender_bank = match get_bank(state.appwrite.as_ref(), &transfer.source_bank_id).await {
        Ok(bank) => bank,
        Err(Error::NotFound) => return Err(Error::SourceBankNotFound),
        Err(error) => return Err(error),
    };
    if sender_bank.user_id != user.id {
        tracing::warn!(
            "User {} tried to send money from bank {} which they do not own",
            user.id,
            sender_bank.id
        );
        return Err(Error::SourceBankNotFound);
    }

    let receiver_account_id = decode_shareable_id(&transfer.shareable_id)?;
    let receiver_bank = get_bank_by_account_id(state.appwrite.as_ref(), &receiver_account_id).await?;

    let transfer_url = state
        .dwolla
        .create_transfer(
            &sender_bank.funding_source_url,
            &receiver_bank.funding_source_url,
            transfer.amount,
        )
        .await?;
    tracing::info!("Created transfer {transfer_url}");

    create_transaction(
        state.appwrite.as_ref(),
        &NewTransfer {
            name: transfer.name.clone(),
            amount: transfer.amount,
            sender_id: user.id.clone(),
            sender_bank_id: sender_bank.id,
            receiver_id: receiver_bank.user_id,
            receiver_bank_id: receiver_bank.id,
            email: transfer.email.clone(),
        },
    )
    .await
}

/// Re-render the form with an error message next to `field`.
async fn form_with_error(
    state: &TransferState,
    user: &User,
    form: &TransferForm,
    errors: &FormErrors,
) -> Response {
    match get_accounts(state.appwrite.as_ref(), state.plaid.as_ref(), &user.id).await {
        Ok(accounts) => transfer_form(&accounts.data, form, errors).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// A route handler for creating a transfer, redirects to the home page on success.
///
/// Invalid fields and an unknown recipient are shown next to the inputs.
pub async fn create_transfer_endpoint(
    State(state): State<TransferState>,
    Extension(token): Extension<Token>,
    Form(form): Form<TransferForm>,
) -> Response {
    let user = match get_logged_in_user(state.appwrite.as_ref(), &token).await {
        Ok(user) => user,
        Err(error) => return error.into_alert_response(),
    };

    let transfer = match form.validate() {
        Ok(transfer) => transfer,
        Err(errors) => return form_with_error(&state, &user, &form, &errors).await,
    };

    match create_transfer(&state, &user, &transfer).await {
        Ok(_) => (
            HxRedirect(endpoints::ROOT.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::InvalidShareableId(_)) | Err(Error::NotFound) => {
            let errors = FormErrors::from([(
                "shareable_id",
                "No bank account matches this shareable ID.".to_owned(),
            )]);
            form_with_error(&state, &user, &form, &errors).await
        }
        Err(Error::SourceBankNotFound) => {
            let errors = FormErrors::from([(
                "source_bank_id",
                "Select one of your linked banks.".to_owned(),
            )]);
            form_with_error(&state, &user, &form, &errors).await
        }
        Err(error) => {
            tracing::error!("could not create transfer: {error}");
            error.into_alert_response()
        }
    }
}
