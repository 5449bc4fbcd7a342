use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub to_name: String,
    pub subject: String,
    pub html: String,
}

/// Outbound mail. Delivery itself lives outside this crate.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> anyhow::Result<()>;
}

/// Writes every message to the log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        log::info!(
            "mail to {} <{}>: {}\n{}",
            email.to_name,
            email.to,
            email.subject,
            email.html
        );
        Ok(())
    }
}

pub fn reset_password_email(public_url: &str, to: &str, username: &str, token: &str) -> Email {
    let link = format!(
        "{}/resetPassword?token={}",
        public_url,
        urlencoding::encode(token)
    );
    Email {
        to: to.to_string(),
        to_name: username.to_string(),
        subject: "Reset Your Password".to_string(),
        html: format!(
            r#"<p>You've requested to reset your password. <a href="{}">Click here</a> to reset your password.</p>"#,
            html_escape::encode_double_quoted_attribute(&link)
        ),
    }
}
