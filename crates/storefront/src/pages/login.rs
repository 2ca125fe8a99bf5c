//! Login form.

use async_trait::async_trait;

use crate::config::Credentials;
use crate::locator::Locator;
use crate::page_object::Page;
use crate::result::ShopResult;
use crate::session::Document;

/// The sign-in page at `/`
#[derive(Debug, Clone)]
pub struct LoginForm {
    document: Document,
}

impl LoginForm {
    /// Bind to a document
    #[must_use]
    pub const fn new(document: Document) -> Self {
        Self { document }
    }

    /// Username field
    #[must_use]
    pub fn username_input(&self) -> Locator {
        self.locator(r#"[data-test="username"]"#)
    }

    /// Password field
    #[must_use]
    pub fn password_input(&self) -> Locator {
        self.locator(r#"[data-test="password"]"#)
    }

    /// Submit button
    #[must_use]
    pub fn login_button(&self) -> Locator {
        self.locator(r#"[data-test="login-button"]"#)
    }

    /// Error banner shown after a rejected attempt
    #[must_use]
    pub fn error_message(&self) -> Locator {
        self.locator(r#"[data-test="error"]"#)
    }

    /// Type username then password
    pub async fn fill_login_form(&self, username: &str, password: &str) -> ShopResult<()> {
        self.username_input().fill(username).await?;
        self.password_input().fill(password).await
    }

    /// Press the login button
    pub async fn submit(&self) -> ShopResult<()> {
        self.login_button().click().await
    }

    /// Fill the form with `credentials` and submit. Does not wait for the
    /// inventory; callers decide what proves the login succeeded.
    pub async fn login(&self, credentials: &Credentials) -> ShopResult<()> {
        tracing::info!(username = %credentials.username, "login");
        self.fill_login_form(&credentials.username, &credentials.password)
            .await?;
        self.submit().await
    }

    /// Banner text, or `None` while no error is shown
    pub async fn get_error_message(&self) -> ShopResult<Option<String>> {
        let banner = self.error_message();
        if banner.count().await? == 0 {
            return Ok(None);
        }
        Ok(Some(banner.text().await?))
    }
}

#[async_trait]
impl Page for LoginForm {
    fn document(&self) -> &Document {
        &self.document
    }

    fn path(&self) -> Option<&str> {
        Some("/")
    }

    fn page_name(&self) -> &str {
        "LoginForm"
    }
}
