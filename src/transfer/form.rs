//! The payment transfer form and its validation.

use std::collections::HashMap;

use email_address::EmailAddress;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    account::Account,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner, text_input,
    },
};

/// Field name to error message.
pub(crate) type FormErrors = HashMap<&'static str, String>;

const MAX_NOTE_LENGTH: usize = 100;

/// Whether `amount` is a whole number of cents, e.g. 12.5 but not 0.004.
pub(crate) fn is_whole_cents(amount: f64) -> bool {
    let cents = amount * 100.0;

    (cents - cents.round()).abs() < 1e-6
}

/// The data entered by the user in the transfer form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferForm {
    /// The bank document ID of the account to send from.
    #[serde(default)]
    pub source_bank_id: String,
    /// An optional note describing the transfer.
    #[serde(default)]
    pub name: String,
    /// The recipient's email.
    #[serde(default)]
    pub email: String,
    /// The recipient's shareable ID.
    #[serde(default)]
    pub shareable_id: String,
    /// The amount in dollars, as typed.
    #[serde(default)]
    pub amount: String,
}

/// A validated transfer form.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidTransfer {
    pub(crate) source_bank_id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) shareable_id: String,
    pub(crate) amount: f64,
}

impl TransferForm {
    /// Check the fields, returning the error message for each invalid field.
    pub(crate) fn validate(&self) -> Result<ValidTransfer, FormErrors> {
        let mut errors = FormErrors::new();

        if self.source_bank_id.trim().is_empty() {
            errors.insert("source_bank_id", "Select a bank to send from.".to_owned());
        }

        if self.name.trim().chars().count() > MAX_NOTE_LENGTH {
            errors.insert(
                "name",
                format!("The note must be at most {MAX_NOTE_LENGTH} characters."),
            );
        }

        if !EmailAddress::is_valid(self.email.trim()) {
            errors.insert("email", "Enter a valid email address.".to_owned());
        }

        if self.shareable_id.trim().is_empty() {
            errors.insert("shareable_id", "Enter the recipient's shareable ID.".to_owned());
        }

        let amount = match self.amount.trim().parse::<f64>() {
            Ok(amount) if amount.is_finite() && amount > 0.0 && is_whole_cents(amount) => {
                Some(amount)
            }
            Ok(amount) if amount.is_finite() && amount > 0.0 => {
                errors.insert(
                    "amount",
                    "The amount cannot have more than two decimal places.".to_owned(),
                );
                None
            }
            _ => {
                errors.insert("amount", "Enter an amount greater than zero.".to_owned());
                None
            }
        };

        match amount {
            Some(amount) if errors.is_empty() => Ok(ValidTransfer {
                source_bank_id: self.source_bank_id.trim().to_owned(),
                name: match self.name.trim() {
                    "" => "Transfer".to_owned(),
                    note => note.to_owned(),
                },
                email: self.email.trim().to_owned(),
                shareable_id: self.shareable_id.trim().to_owned(),
                amount,
            }),
            _ => Err(errors),
        }
    }
}

fn field_error(error_message: Option<&str>) -> Markup {
    html! {
        @if let Some(error_message) = error_message {
            p class="text-red-500 text-base" { (error_message) }
        }
    }
}

/// The transfer form, filled in with `data` and showing `errors` next to the
/// fields.
pub(crate) fn transfer_form(accounts: &[Account], data: &TransferForm, errors: &FormErrors) -> Markup {
    let error = |field: &str| errors.get(field).map(String::as_str);

    html! {
        form
            hx-post=(endpoints::TRANSFERS_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full max-w-xl space-y-4 md:space-y-6"
        {
            div
            {
                label for="source_bank_id" class=(FORM_LABEL_STYLE) { "Select Source Bank" }

                select id="source_bank_id" name="source_bank_id" class=(FORM_TEXT_INPUT_STYLE) required
                {
                    @for account in accounts {
                        option
                            value=(account.appwrite_item_id)
                            selected[account.appwrite_item_id == data.source_bank_id]
                        {
                            (account.name) " (" (account.mask) ")"
                        }
                    }
                }

                (field_error(error("source_bank_id")))
            }

            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Transfer Note (Optional)" }

                textarea
                    id="name"
                    name="name"
                    rows="3"
                    maxlength=(MAX_NOTE_LENGTH)
                    placeholder="Write a short note here"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (data.name)
                }

                (field_error(error("name")))
            }

            h2 class="text-lg font-semibold" { "Bank account details" }

            (text_input("email", "Recipient's Email Address", "email", "ex: johndoe@gmail.com", &data.email, error("email")))
            (text_input("shareable_id", "Receiver's Plaid Sharable Id", "text", "Enter the public account number", &data.shareable_id, error("shareable_id")))

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper w-full"
                {
                    input
                        id="amount"
                        name="amount"
                        type="number"
                        min="0.01"
                        step="0.01"
                        placeholder="ex: 5.00"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required
                        value=(data.amount);
                }

                (field_error(error("amount")))
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Transfer Funds"
            }
        }
    }
}
