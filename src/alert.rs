//! Alert system for displaying error messages to users.
//!
//! Alerts are rendered as HTML fragments that HTMX swaps into the alert
//! container defined in [crate::html::base].

use maud::{Markup, html};

/// A message to display to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The operation failed.
    Error {
        /// The headline for the alert.
        message: String,
        /// Further details to show under the headline.
        details: String,
    },
}

impl Alert {
    /// Render the alert as a dismissable HTML fragment.
    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Error { message, details } => (
                "flex items-start p-4 mb-4 text-red-800 border border-red-300 rounded-lg \
                bg-red-50 dark:bg-gray-800 dark:text-red-400 dark:border-red-800",
                message,
                details,
            ),
        };

        html! {
            div
                role="alert"
                class=(container_style)
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (message) }

                    @if !details.is_empty() {
                        p class="text-sm mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="ms-3 text-sm font-semibold"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn error_alert_renders_message_and_details() {
        let alert = Alert::Error {
            message: "Could not sign in".to_owned(),
            details: "Try again".to_owned(),
        };

        let html = Html::parse_fragment(&alert.into_html().into_string());

        let paragraphs = html
            .select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(paragraphs, vec!["Could not sign in", "Try again"]);
    }

    #[test]
    fn empty_details_are_omitted() {
        let alert = Alert::Error {
            message: "Something went wrong".to_owned(),
            details: String::new(),
        };

        let html = Html::parse_fragment(&alert.into_html().into_string());

        assert_eq!(html.select(&Selector::parse("p").unwrap()).count(), 1);
    }
}
