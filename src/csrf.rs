//! CSRF token injection into the page's POST forms.

/// Name of the hidden field carrying the token.
pub const CSRF_FIELD: &str = "csrf_token";

/// Page-level CSRF token, read once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Read the token from the page's meta value. Absent or blank means none.
    pub fn from_meta(content: Option<&str>) -> Option<Self> {
        content
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| CsrfToken(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
    pub hidden: bool,
}

/// A form on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub id: String,
    pub method: String,
    pub fields: Vec<FormField>,
}

impl Form {
    pub fn new(id: &str, method: &str) -> Self {
        Self {
            id: id.to_string(),
            method: method.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn is_post(&self) -> bool {
        self.method.eq_ignore_ascii_case("post")
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }

    /// Set a visible field's value, adding the field if missing.
    pub fn set_field(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => field.value = value.to_string(),
            None => self.fields.push(FormField {
                name: name.to_string(),
                value: value.to_string(),
                hidden: false,
            }),
        }
    }

    /// Name/value pairs that would be submitted, followed by one
    /// `field_name` entry per value in `multi`.
    pub fn submission<'a, I>(&self, field_name: &str, multi: I) -> Vec<(String, String)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.value.clone()))
            .chain(
                multi
                    .into_iter()
                    .map(|value| (field_name.to_string(), value.to_string())),
            )
            .collect()
    }
}

/// Append the token as a hidden field to every POST form.
///
/// # Returns
/// * `usize` - Number of forms that received the field
///
/// # Details
/// Forms that already carry the field are skipped, as are non-POST forms.
/// Without a token nothing changes.
pub fn inject_csrf(forms: &mut [Form], token: Option<&CsrfToken>) -> usize {
    let Some(token) = token else {
        return 0;
    };

    let mut injected = 0;
    for form in forms.iter_mut().filter(|form| form.is_post()) {
        if form.field(CSRF_FIELD).is_some() {
            continue;
        }
        form.fields.push(FormField {
            name: CSRF_FIELD.to_string(),
            value: token.as_str().to_string(),
            hidden: true,
        });
        injected += 1;
    }
    injected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_meta() {
        assert!(CsrfToken::from_meta(None).is_none());
        assert!(CsrfToken::from_meta(Some("  ")).is_none());
        assert_eq!(CsrfToken::from_meta(Some(" abc ")).unwrap().as_str(), "abc");
    }

    #[test]
    fn test_inject_only_into_post_forms_once() {
        let token = CsrfToken::from_meta(Some("tok"));
        let mut forms = vec![
            Form::new("assign", "POST"),
            Form::new("search", "get"),
            Form::new("owners", "post"),
        ];
        assert_eq!(inject_csrf(&mut forms, token.as_ref()), 2);
        assert_eq!(forms[0].field(CSRF_FIELD), Some("tok"));
        assert!(forms[0].fields[0].hidden);
        assert!(forms[1].field(CSRF_FIELD).is_none());
        assert_eq!(forms[2].field(CSRF_FIELD), Some("tok"));

        assert_eq!(inject_csrf(&mut forms, token.as_ref()), 0);
        assert_eq!(forms[0].fields.len(), 1);
    }

    #[test]
    fn test_inject_without_token_is_noop() {
        let mut forms = vec![Form::new("assign", "POST")];
        assert_eq!(inject_csrf(&mut forms, None), 0);
        assert!(forms[0].fields.is_empty());
    }

    #[test]
    fn test_set_field_updates_in_place() {
        let mut form = Form::new("assign", "POST");
        form.set_field("repair_id", "");
        form.set_field("repair_id", "12");
        assert_eq!(form.fields.len(), 1);
        assert_eq!(form.field("repair_id"), Some("12"));
        assert!(!form.fields[0].hidden);
    }

    #[test]
    fn test_submission_appends_multi_values() {
        let mut form = Form::new("assign", "POST");
        inject_csrf(std::slice::from_mut(&mut form), CsrfToken::from_meta(Some("t")).as_ref());
        let pairs = form.submission("employee_ids", ["3", "7"]);
        assert_eq!(
            pairs,
            vec![
                ("csrf_token".to_string(), "t".to_string()),
                ("employee_ids".to_string(), "3".to_string()),
                ("employee_ids".to_string(), "7".to_string()),
            ]
        );
    }
}
