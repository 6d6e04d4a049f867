//! Local form validation.
//!
//! Every form is validated before any backend call is made. A failed
//! validation yields a per-field error struct that the page re-renders next
//! to the preserved input; it never reaches the synchronization layer.
//!
//! All text fields are trimmed before they are checked and before they are
//! submitted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Email, Price, ProductId};

/// Minimum number of characters in a feedback message.
pub const MIN_FEEDBACK_LENGTH: usize = 10;

/// Accepted phone number length range (in characters).
const PHONE_LENGTH: core::ops::RangeInclusive<usize> = 7..=15;

/// Field error messages shown to visitors and admins.
pub mod messages {
    pub const NAME_REQUIRED: &str = "Please enter your name.";
    pub const PHONE_REQUIRED: &str = "Please enter your phone number.";
    pub const PHONE_INVALID: &str = "Please enter a valid phone number.";
    pub const ADDRESS_REQUIRED: &str = "Please enter your delivery address.";
    pub const PRODUCT_REQUIRED: &str = "Please select a product.";
    pub const QUANTITY_INVALID: &str = "Please enter a valid quantity (min 1).";

    pub const EMAIL_REQUIRED: &str = "Please enter your email.";
    pub const EMAIL_INVALID: &str = "Please enter a valid email address.";
    pub const FEEDBACK_REQUIRED: &str = "Please write your feedback.";
    pub const FEEDBACK_TOO_SHORT: &str = "Feedback must be at least 10 characters.";

    pub const PRODUCT_NAME_REQUIRED: &str = "Product name is required.";
    pub const DESCRIPTION_REQUIRED: &str = "Description is required.";
    pub const PRICE_INVALID: &str = "Enter a valid price.";
    pub const STOCK_INVALID: &str = "Enter a valid stock quantity.";
    pub const CATEGORY_REQUIRED: &str = "Category is required.";
}

fn is_valid_phone(phone: &str) -> bool {
    PHONE_LENGTH.contains(&phone.chars().count())
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
}

// =============================================================================
// Order form
// =============================================================================

/// Raw order form input as submitted by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderForm {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub product_id: String,
    pub quantity: String,
}

/// A validated order ready to be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Per-field order form errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("order form has invalid fields")]
pub struct OrderFormErrors {
    pub customer_name: Option<&'static str>,
    pub phone: Option<&'static str>,
    pub address: Option<&'static str>,
    pub product_id: Option<&'static str>,
    pub quantity: Option<&'static str>,
}

impl OrderFormErrors {
    /// Whether no field failed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.customer_name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.product_id.is_none()
            && self.quantity.is_none()
    }
}

impl OrderForm {
    /// A blank form with quantity 1 and an optional preselected product.
    #[must_use]
    pub fn new(product_id: Option<ProductId>) -> Self {
        Self {
            product_id: product_id.map(|id| id.to_string()).unwrap_or_default(),
            quantity: "1".to_string(),
            ..Self::default()
        }
    }

    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns [`OrderFormErrors`] naming every invalid field.
    pub fn validate(&self) -> Result<NewOrder, OrderFormErrors> {
        let mut errors = OrderFormErrors::default();

        let customer_name = self.customer_name.trim();
        if customer_name.is_empty() {
            errors.customer_name = Some(messages::NAME_REQUIRED);
        }

        let phone = self.phone.trim();
        if phone.is_empty() {
            errors.phone = Some(messages::PHONE_REQUIRED);
        } else if !is_valid_phone(phone) {
            errors.phone = Some(messages::PHONE_INVALID);
        }

        let address = self.address.trim();
        if address.is_empty() {
            errors.address = Some(messages::ADDRESS_REQUIRED);
        }

        let product_id = self.product_id.parse::<ProductId>().ok();
        if product_id.is_none() {
            errors.product_id = Some(messages::PRODUCT_REQUIRED);
        }

        let quantity = self.quantity.trim().parse::<u32>().ok().filter(|q| *q >= 1);
        if quantity.is_none() {
            errors.quantity = Some(messages::QUANTITY_INVALID);
        }

        match (product_id, quantity) {
            (Some(product_id), Some(quantity)) if errors.is_empty() => Ok(NewOrder {
                customer_name: customer_name.to_owned(),
                phone: phone.to_owned(),
                address: address.to_owned(),
                product_id,
                quantity,
            }),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Contact form
// =============================================================================

/// Raw contact (feedback) form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// A validated feedback submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: Email,
    pub message: String,
}

/// Per-field contact form errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("contact form has invalid fields")]
pub struct ContactFormErrors {
    pub name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub message: Option<&'static str>,
}

impl ContactForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns [`ContactFormErrors`] naming every invalid field.
    pub fn validate(&self) -> Result<NewContactMessage, ContactFormErrors> {
        let mut errors = ContactFormErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.name = Some(messages::NAME_REQUIRED);
        }

        let email = self.email.trim();
        let parsed_email = if email.is_empty() {
            errors.email = Some(messages::EMAIL_REQUIRED);
            None
        } else {
            let parsed = Email::parse(email).ok();
            if parsed.is_none() {
                errors.email = Some(messages::EMAIL_INVALID);
            }
            parsed
        };

        let message = self.message.trim();
        if message.is_empty() {
            errors.message = Some(messages::FEEDBACK_REQUIRED);
        } else if message.chars().count() < MIN_FEEDBACK_LENGTH {
            errors.message = Some(messages::FEEDBACK_TOO_SHORT);
        }

        match parsed_email {
            Some(email) if errors.name.is_none() && errors.message.is_none() => {
                Ok(NewContactMessage {
                    name: name.to_owned(),
                    email,
                    message: message.to_owned(),
                })
            }
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Product form
// =============================================================================

/// Raw product form input from the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock_quantity: String,
    pub image_url: String,
    pub category: String,
}

/// Validated product fields for create and update calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock_quantity: u64,
    pub image_url: String,
    pub category: String,
}

/// Per-field product form errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("product form has invalid fields")]
pub struct ProductFormErrors {
    pub name: Option<&'static str>,
    pub description: Option<&'static str>,
    pub price: Option<&'static str>,
    pub stock_quantity: Option<&'static str>,
    pub category: Option<&'static str>,
}

impl ProductForm {
    /// Prefill the form from an existing product.
    #[must_use]
    pub fn from_product(product: &crate::types::Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.plain(),
            stock_quantity: product.stock_quantity.to_string(),
            image_url: product.image_url.clone(),
            category: product.category.clone(),
        }
    }

    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns [`ProductFormErrors`] naming every invalid field.
    pub fn validate(&self) -> Result<ProductDraft, ProductFormErrors> {
        let mut errors = ProductFormErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.name = Some(messages::PRODUCT_NAME_REQUIRED);
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.description = Some(messages::DESCRIPTION_REQUIRED);
        }

        let price = Price::parse(&self.price).ok();
        if price.is_none() {
            errors.price = Some(messages::PRICE_INVALID);
        }

        let stock_quantity = self.stock_quantity.trim().parse::<u64>().ok();
        if stock_quantity.is_none() {
            errors.stock_quantity = Some(messages::STOCK_INVALID);
        }

        let category = self.category.trim();
        if category.is_empty() {
            errors.category = Some(messages::CATEGORY_REQUIRED);
        }

        match (price, stock_quantity) {
            (Some(price), Some(stock_quantity))
                if errors.name.is_none()
                    && errors.description.is_none()
                    && errors.category.is_none() =>
            {
                Ok(ProductDraft {
                    name: name.to_owned(),
                    description: description.to_owned(),
                    price,
                    stock_quantity,
                    image_url: self.image_url.trim().to_owned(),
                    category: category.to_owned(),
                })
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_order() -> OrderForm {
        OrderForm {
            customer_name: "  Priya Sharma ".to_string(),
            phone: "+91 98765 43210".to_string(),
            address: "12 MG Road, Bengaluru 560001".to_string(),
            product_id: "7".to_string(),
            quantity: "2".to_string(),
        }
    }

    #[test]
    fn test_order_valid_is_trimmed() {
        let order = valid_order().validate().unwrap();
        assert_eq!(order.customer_name, "Priya Sharma");
        assert_eq!(order.product_id, ProductId::new(7));
        assert_eq!(order.quantity, 2);
    }

    #[test]
    fn test_order_quantity_zero_rejected() {
        let form = OrderForm {
            quantity: "0".to_string(),
            ..valid_order()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.quantity, Some(messages::QUANTITY_INVALID));
        assert!(errors.quantity.unwrap().contains("valid quantity (min 1)"));
        assert_eq!(errors.customer_name, None);
    }

    #[test]
    fn test_order_quantity_garbage_rejected() {
        for quantity in ["", "abc", "-3", "1.5"] {
            let form = OrderForm {
                quantity: quantity.to_string(),
                ..valid_order()
            };
            assert_eq!(
                form.validate().unwrap_err().quantity,
                Some(messages::QUANTITY_INVALID),
                "quantity {quantity:?}"
            );
        }
    }

    #[test]
    fn test_order_phone_rules() {
        let empty = OrderForm {
            phone: "   ".to_string(),
            ..valid_order()
        };
        assert_eq!(
            empty.validate().unwrap_err().phone,
            Some(messages::PHONE_REQUIRED)
        );

        for phone in ["12345", "phone-number", "1234567890123456"] {
            let form = OrderForm {
                phone: phone.to_string(),
                ..valid_order()
            };
            assert_eq!(
                form.validate().unwrap_err().phone,
                Some(messages::PHONE_INVALID),
                "phone {phone:?}"
            );
        }

        let ok = OrderForm {
            phone: "(080) 555-1234".to_string(),
            ..valid_order()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_order_reports_every_missing_field() {
        let errors = OrderForm::default().validate().unwrap_err();
        assert_eq!(errors.customer_name, Some(messages::NAME_REQUIRED));
        assert_eq!(errors.phone, Some(messages::PHONE_REQUIRED));
        assert_eq!(errors.address, Some(messages::ADDRESS_REQUIRED));
        assert_eq!(errors.product_id, Some(messages::PRODUCT_REQUIRED));
        assert_eq!(errors.quantity, Some(messages::QUANTITY_INVALID));
    }

    #[test]
    fn test_order_new_prefills_quantity_and_product() {
        let form = OrderForm::new(Some(ProductId::new(3)));
        assert_eq!(form.product_id, "3");
        assert_eq!(form.quantity, "1");
    }

    #[test]
    fn test_contact_not_an_email() {
        let form = ContactForm {
            name: "Sarah".to_string(),
            email: "not-an-email".to_string(),
            message: "Lovely crochet work!".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.email, Some(messages::EMAIL_INVALID));
        assert_eq!(errors.name, None);
        assert_eq!(errors.message, None);
    }

    #[test]
    fn test_contact_message_length() {
        let form = ContactForm {
            name: "Sarah".to_string(),
            email: "sarah@example.com".to_string(),
            message: "  ten chars! ".to_string(),
        };
        assert!(form.validate().is_ok());

        let short = ContactForm {
            message: "short".to_string(),
            ..form.clone()
        };
        assert_eq!(
            short.validate().unwrap_err().message,
            Some(messages::FEEDBACK_TOO_SHORT)
        );

        let empty = ContactForm {
            message: String::new(),
            ..form
        };
        assert_eq!(
            empty.validate().unwrap_err().message,
            Some(messages::FEEDBACK_REQUIRED)
        );
    }

    #[test]
    fn test_contact_valid() {
        let form = ContactForm {
            name: " Sarah Johnson ".to_string(),
            email: " sarah@example.com ".to_string(),
            message: "The teddy bear arrived safely, thank you!".to_string(),
        };
        let message = form.validate().unwrap();
        assert_eq!(message.name, "Sarah Johnson");
        assert_eq!(message.email.as_str(), "sarah@example.com");
    }

    #[test]
    fn test_product_form_rules() {
        let form = ProductForm {
            name: "Woolen Teddy Bear".to_string(),
            description: "Hand-knitted".to_string(),
            price: "499".to_string(),
            stock_quantity: "10".to_string(),
            image_url: String::new(),
            category: "Woolen Toys".to_string(),
        };
        let draft = form.validate().unwrap();
        assert_eq!(draft.price.to_string(), "₹499.00");
        assert_eq!(draft.stock_quantity, 10);

        let bad = ProductForm {
            price: "-1".to_string(),
            stock_quantity: "-2".to_string(),
            category: " ".to_string(),
            ..form
        };
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.price, Some(messages::PRICE_INVALID));
        assert_eq!(errors.stock_quantity, Some(messages::STOCK_INVALID));
        assert_eq!(errors.category, Some(messages::CATEGORY_REQUIRED));
        assert_eq!(errors.name, None);
    }
}
