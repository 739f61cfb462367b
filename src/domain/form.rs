use maud::{DOCTYPE, Markup, html};
use serde::Serialize;

/// Name of the generated HTML form.
pub const FORM_NAME: &str = "AssistPaymentForm";

/// A browser form post to the gateway.
///
/// Fields keep their insertion order; the gateway's field names are part of
/// its wire contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedirectForm {
    pub url: String,
    pub method: &'static str,
    fields: Vec<(String, String)>,
}

impl RedirectForm {
    /// Creates an empty `POST` form targeting `url`.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "POST",
            fields: Vec::new(),
        }
    }

    /// Appends a field after the ones already present.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Value of the first field called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether a field with this name was added.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Fields as `(name, value)` pairs in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// A page that posts the form as soon as it loads. Values are escaped.
    pub fn to_markup(&self) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta name="viewport" content="width=device-width, initial-scale=1";
                }
                body onload=(format!("document.{FORM_NAME}.submit()")) {
                    form name=(FORM_NAME) method=(self.method) action=(self.url) {
                        @for (name, value) in self.fields() {
                            input type="hidden" name=(name) value=(value);
                        }
                    }
                }
            }
        }
    }

    /// [`to_markup`](Self::to_markup) rendered to a string.
    pub fn to_html(&self) -> String {
        self.to_markup().into_string()
    }
}
