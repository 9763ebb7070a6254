use std::collections::HashMap;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tinytemplate::TinyTemplate;
use crate::auth::OtpType;

static LAYOUT: &str = include_str!("layout.html");
static CONFIRM_SIGNUP: &str = include_str!("confirm_signup.html");
static EMAIL_CHANGE: &str = include_str!("email_change.html");
static RESET_PASSWORD: &str = include_str!("reset_password.html");
static MAGIC_LINK: &str = include_str!("magic_link.html");
static INVITE: &str = include_str!("invite.html");

const FOOTER_URL: &str = "https://supabase-modules-docs.vercel.app";
const FOOTER_TITLE: &str = "Supabase Modules";
const FOOTER_TAGLINE: &str = "Build smarter with pre-built modules today";

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash,
    strum_macros::Display, strum_macros::EnumString, strum_macros::EnumIter, strum_macros::IntoStaticStr
)]
#[strum(serialize_all = "snake_case")]
pub enum EmailKind {
    ConfirmSignup,
    EmailChange,
    ResetPassword,
    MagicLink,
    Invite,
}

impl EmailKind {
    fn template(&self) -> &'static str {
        match self {
            EmailKind::ConfirmSignup => CONFIRM_SIGNUP,
            EmailKind::EmailChange => EMAIL_CHANGE,
            EmailKind::ResetPassword => RESET_PASSWORD,
            EmailKind::MagicLink => MAGIC_LINK,
            EmailKind::Invite => INVITE,
        }
    }

    pub fn otp_type(&self) -> OtpType {
        match self {
            EmailKind::ConfirmSignup => OtpType::Signup,
            EmailKind::EmailChange => OtpType::EmailChange,
            EmailKind::ResetPassword => OtpType::Recovery,
            EmailKind::MagicLink => OtpType::Magiclink,
            EmailKind::Invite => OtpType::Invite,
        }
    }

    /// Where the user lands after the link has been verified.
    pub fn next(&self) -> &'static str {
        match self {
            EmailKind::ConfirmSignup | EmailKind::EmailChange => "/login",
            EmailKind::ResetPassword => "/settings/password",
            EmailKind::MagicLink => "/",
            EmailKind::Invite => "/settings",
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            EmailKind::ConfirmSignup => "Confirm your signup",
            EmailKind::EmailChange => "Confirm email change",
            EmailKind::ResetPassword => "Reset your password",
            EmailKind::MagicLink => "Your magic link",
            EmailKind::Invite => "You have been invited",
        }
    }

    fn preview(&self) -> &'static str {
        match self {
            EmailKind::ConfirmSignup => "Confirm your email address",
            EmailKind::EmailChange => "Confirm email change",
            EmailKind::ResetPassword => "Reset the password of your account",
            EmailKind::MagicLink => "Log in with this magic link",
            EmailKind::Invite => "Accept your invitation",
        }
    }
}

/// Values interpolated into the templates. By default they are the auth service's own
/// template tokens, so the rendered HTML can be uploaded as-is.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Placeholders {
    pub site_url: String,
    pub token_hash: String,
    pub email: String,
    pub new_email: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            site_url: "{{ .SiteURL }}".to_owned(),
            token_hash: "{{ .TokenHash }}".to_owned(),
            email: "{{ .Email }}".to_owned(),
            new_email: "{{ .NewEmail }}".to_owned(),
        }
    }
}

#[derive(Serialize)]
struct BodyContext<'a> {
    confirmation_url: String,
    site_url: &'a str,
    email: &'a str,
    new_email: &'a str,
}

#[derive(Serialize)]
struct LayoutContext<'a> {
    subject: &'a str,
    preview: &'a str,
    body: String,
    footer_url: &'a str,
    footer_title: &'a str,
    footer_tagline: &'a str,
}

#[derive(Serialize, Clone, Debug)]
pub struct RenderedEmail {
    pub subject: String,
    pub preview: String,
    pub html: String,
}

#[derive(Clone)]
pub struct EmailContainer {
    emails: Arc<HashMap<EmailKind, RenderedEmail>>,
}

impl EmailContainer {
    pub fn get(&self, kind: EmailKind) -> Option<&RenderedEmail> {
        self.emails.get(&kind)
    }
}

pub fn confirmation_url(kind: EmailKind, placeholders: &Placeholders) -> String {
    format!("{}/auth/confirm?token_hash={}&type={}&next={}",
            placeholders.site_url.trim_end_matches('/'),
            placeholders.token_hash,
            kind.otp_type(),
            kind.next())
}

pub fn render_email(kind: EmailKind, placeholders: &Placeholders) -> Result<RenderedEmail, tinytemplate::error::Error> {
    let name: &'static str = kind.into();
    let mut tt = TinyTemplate::new();
    tt.add_template("layout", LAYOUT)?;
    tt.add_template(name, kind.template())?;

    let body = tt.render(name, &BodyContext {
        confirmation_url: confirmation_url(kind, placeholders),
        site_url: &placeholders.site_url,
        email: &placeholders.email,
        new_email: &placeholders.new_email,
    })?;
    let html = tt.render("layout", &LayoutContext {
        subject: kind.subject(),
        preview: kind.preview(),
        body,
        footer_url: FOOTER_URL,
        footer_title: FOOTER_TITLE,
        footer_tagline: FOOTER_TAGLINE,
    })?;

    Ok(RenderedEmail {
        subject: kind.subject().to_owned(),
        preview: kind.preview().to_owned(),
        html,
    })
}

pub fn render_email_templates(placeholders: &Placeholders) -> Result<EmailContainer, tinytemplate::error::Error> {
    let emails = EmailKind::iter()
        .map(|kind| render_email(kind, placeholders).map(|email| (kind, email)))
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(EmailContainer { emails: Arc::new(emails) })
}

#[cfg(test)]
mod test {
    use std::str::FromStr;
    use strum::IntoEnumIterator;
    use super::*;

    #[test]
    fn all_templates_render_with_auth_tokens() {
        let container = render_email_templates(&Placeholders::default())
            .expect("couldn't render the templates");
        for kind in EmailKind::iter() {
            let email = container.get(kind).expect("every kind must be rendered");
            assert!(email.html.contains("{{ .SiteURL }}/auth/confirm?token_hash={{ .TokenHash }}&amp;type="));
            assert!(email.html.contains(&format!("<title>{}</title>", kind.subject())));
            assert!(email.html.contains(FOOTER_TAGLINE));
        }
    }

    #[test]
    fn email_change() {
        let email = render_email(EmailKind::EmailChange, &Placeholders::default())
            .expect("couldn't render the template");
        assert_eq!(email.subject, "Confirm email change");
        assert!(email.html.contains("from {{ .Email }} to {{ .NewEmail }}:"));
        assert!(email.html.contains("&amp;type=email_change&amp;next=/login"));
    }

    #[test]
    fn concrete_values_are_escaped() {
        let placeholders = Placeholders {
            site_url: "https://example.com/".to_owned(),
            token_hash: "abc".to_owned(),
            email: "<script>@example.com".to_owned(),
            new_email: "new@example.com".to_owned(),
        };
        assert_eq!(confirmation_url(EmailKind::ResetPassword, &placeholders),
                   "https://example.com/auth/confirm?token_hash=abc&type=recovery&next=/settings/password");

        let email = render_email(EmailKind::EmailChange, &placeholders).unwrap();
        assert!(email.html.contains("&lt;script&gt;@example.com"));
        assert!(!email.html.contains("<script>"));
    }

    #[test]
    fn kinds_by_name() {
        assert_eq!(EmailKind::from_str("magic_link").unwrap(), EmailKind::MagicLink);
        assert_eq!(EmailKind::ConfirmSignup.to_string(), "confirm_signup");
        assert!(EmailKind::from_str("welcome").is_err());
    }
}
