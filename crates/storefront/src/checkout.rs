//! Checkout hand-off via a messaging deep link.
//!
//! There is no payment flow. Checkout composes a plain-text order summary
//! and wraps it in a `wa.me` link that opens a pre-filled chat with the
//! store. Whether the order is completed afterwards is unknown to the store.

use aioko_core::format_price;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::cart::{CartStore, CartSummary};
use crate::storage::CartStorage;

/// Base of the messaging deep link.
pub const WHATSAPP_BASE_URL: &str = "https://wa.me/";

/// Store number orders are sent to.
pub const DEFAULT_WHATSAPP_NUMBER: &str = "2349060185654";

/// Checkout errors.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout was started with nothing in the cart.
    #[error("Cannot check out an empty cart")]
    EmptyCartCheckout,

    /// The deep link could not be built.
    #[error("Invalid checkout link: {0}")]
    InvalidLink(#[from] url::ParseError),
}

/// Checkout hand-off settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// International number without `+` or spaces.
    pub whatsapp_number: String,
    /// Paragraph placed before the order lines.
    pub greeting: Option<String>,
    /// Paragraph placed after the total.
    pub sign_off: Option<String>,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_owned(),
            greeting: None,
            sign_off: None,
        }
    }
}

/// A composed order, ready to be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHandoff {
    /// Plain-text order summary.
    pub message: String,
    /// Deep link carrying the message.
    pub url: Url,
}

/// Builds order hand-offs.
#[derive(Debug, Clone, Default)]
pub struct Checkout {
    config: CheckoutConfig,
}

impl Checkout {
    /// Create a checkout with the given settings.
    #[must_use]
    pub const fn new(config: CheckoutConfig) -> Self {
        Self { config }
    }

    /// Compose the order message for a cart summary.
    ///
    /// One `"{quantity}x {name} - {line total}"` line per cart line, a blank
    /// line, then `"Total: {grand total}"`, optionally wrapped by the
    /// configured greeting and sign-off paragraphs.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCartCheckout` if the cart has no lines.
    pub fn order_message(&self, summary: &CartSummary) -> Result<String, CheckoutError> {
        if summary.is_empty() {
            return Err(CheckoutError::EmptyCartCheckout);
        }

        let lines = summary
            .lines
            .iter()
            .map(|line| {
                format!(
                    "{}x {} - {}",
                    line.quantity,
                    line.name,
                    format_price(line.line_total())
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut message = String::new();
        if let Some(greeting) = &self.config.greeting {
            message.push_str(greeting);
            message.push_str("\n\n");
        }
        message.push_str(&lines);
        message.push_str("\n\nTotal: ");
        message.push_str(&format_price(summary.total));
        if let Some(sign_off) = &self.config.sign_off {
            message.push_str("\n\n");
            message.push_str(sign_off);
        }

        Ok(message)
    }

    /// Compose the message and its deep link.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCartCheckout` if the cart has no lines,
    /// or `CheckoutError::InvalidLink` if the configured number produces an
    /// unparseable URL.
    #[instrument(skip_all, fields(lines = summary.lines.len()))]
    pub fn handoff(&self, summary: &CartSummary) -> Result<OrderHandoff, CheckoutError> {
        let message = self.order_message(summary)?;
        let url = Url::parse(&format!(
            "{WHATSAPP_BASE_URL}{}?text={}",
            self.config.whatsapp_number,
            urlencoding::encode(&message)
        ))?;

        tracing::info!(total = %summary.total, "Checkout hand-off prepared");
        Ok(OrderHandoff { message, url })
    }

    /// Hand off the current contents of `cart`.
    ///
    /// # Errors
    ///
    /// See [`Checkout::handoff`].
    pub fn begin<S: CartStorage>(&self, cart: &CartStore<S>) -> Result<OrderHandoff, CheckoutError> {
        self.handoff(&cart.summary())
    }
}
