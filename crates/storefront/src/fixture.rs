//! Session fixtures
//!
//! A fixture owns a resource for the duration of one test body. The
//! authenticated fixture opens a fresh browser session, signs in through the
//! login form and hands the document to the body; the session is closed
//! afterwards whether the body succeeded, failed or panicked.
//!
//! ```ignore
//! with_pages(launcher, config, |pages| async move {
//!     let cards = pages.products_page().get_product_cards().await?;
//!     assert_eq!(cards.len(), 6);
//!     Ok(())
//! })
//! .await?;
//! ```

use async_trait::async_trait;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::config::ShopConfig;
use crate::driver::BrowserLauncher;
use crate::manager::Pages;
use crate::page_object::Page;
use crate::pages::{LoginForm, ProductsPage};
use crate::result::{ShopError, ShopResult};
use crate::session::{Document, Session};
use crate::wait::ElementState;

/// State of a fixture over its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureState {
    /// Created, not set up yet
    Registered,
    /// Set up successfully
    SetUp,
    /// Torn down
    TornDown,
    /// Setup failed
    Failed,
}

/// A resource set up before a test body and torn down after it.
#[async_trait]
pub trait Fixture: Send {
    /// What the body receives
    type Output: Send;

    /// Acquire the resource. On failure the fixture has already released
    /// whatever it acquired.
    async fn setup(&mut self) -> ShopResult<Self::Output>;

    /// Release the resource. Idempotent.
    async fn teardown(&mut self) -> ShopResult<()>;

    /// Current state
    fn state(&self) -> FixtureState;

    /// Name for logging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A signed-in session on the shop's inventory page
#[derive(Debug)]
pub struct AuthenticatedPage {
    launcher: Arc<dyn BrowserLauncher>,
    config: ShopConfig,
    session: Option<Session>,
    state: FixtureState,
}

impl AuthenticatedPage {
    /// Sign in with `config.credentials` on sessions from `launcher`.
    ///
    /// Only the credentials and the login timeout are read here; base URL
    /// and wait timeouts come from the launcher, so build both from the same
    /// config (see [`crate::MockBrowser::from_config`]).
    #[must_use]
    pub fn new(launcher: Arc<dyn BrowserLauncher>, config: ShopConfig) -> Self {
        Self {
            launcher,
            config,
            session: None,
            state: FixtureState::Registered,
        }
    }

    /// The open session, between setup and teardown
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn setup_error(&self, source: ShopError) -> ShopError {
        ShopError::FixtureSetup {
            fixture: self.name().to_string(),
            source: Box::new(source),
        }
    }
}

/// Login, then wait for the inventory's sort control as proof of success
async fn sign_in(document: &Document, config: &ShopConfig) -> ShopResult<()> {
    let login = LoginForm::new(document.clone());
    login.open().await?;
    login.login(&config.credentials).await?;
    ProductsPage::new(document.clone())
        .sort_dropdown()
        .wait_for(ElementState::Visible, Some(config.login_timeout()))
        .await
}

#[async_trait]
impl Fixture for AuthenticatedPage {
    type Output = Document;

    async fn setup(&mut self) -> ShopResult<Document> {
        tracing::info!(
            fixture = self.name(),
            username = %self.config.credentials.username,
            "setup"
        );
        let session = match self.launcher.new_session().await {
            Ok(session) => session,
            Err(err) => {
                self.state = FixtureState::Failed;
                return Err(self.setup_error(err));
            }
        };
        let document = session.document().clone();
        if let Err(err) = sign_in(&document, &self.config).await {
            self.state = FixtureState::Failed;
            if let Err(close_err) = session.close().await {
                tracing::warn!(error = %close_err, "closing session after failed setup");
            }
            return Err(self.setup_error(err));
        }
        tracing::debug!(session = %session.id(), "signed in");
        self.session = Some(session);
        self.state = FixtureState::SetUp;
        Ok(document)
    }

    async fn teardown(&mut self) -> ShopResult<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        tracing::info!(fixture = self.name(), session = %session.id(), "teardown");
        self.state = FixtureState::TornDown;
        session
            .close()
            .await
            .map_err(|source| ShopError::FixtureTeardown {
                fixture: self.name().to_string(),
                source: Box::new(source),
            })
    }

    fn state(&self) -> FixtureState {
        self.state
    }

    fn name(&self) -> &str {
        "authenticated_page"
    }
}

/// Every page object over an authenticated session
#[derive(Debug)]
pub struct PagesFixture {
    inner: AuthenticatedPage,
}

impl PagesFixture {
    /// Same arguments as [`AuthenticatedPage::new`]
    #[must_use]
    pub fn new(launcher: Arc<dyn BrowserLauncher>, config: ShopConfig) -> Self {
        Self {
            inner: AuthenticatedPage::new(launcher, config),
        }
    }
}

#[async_trait]
impl Fixture for PagesFixture {
    type Output = Pages;

    async fn setup(&mut self) -> ShopResult<Pages> {
        Ok(Pages::new(self.inner.setup().await?))
    }

    async fn teardown(&mut self) -> ShopResult<()> {
        self.inner.teardown().await
    }

    fn state(&self) -> FixtureState {
        self.inner.state()
    }

    fn name(&self) -> &str {
        "pages"
    }
}

/// Set up `fixture`, run `body` with its output and tear it down.
///
/// Teardown always runs once setup succeeded. A body error wins over a
/// teardown error (which is then only logged); a body panic resumes after
/// teardown.
pub async fn run_fixture<F, B, Fut, T>(mut fixture: F, body: B) -> ShopResult<T>
where
    F: Fixture,
    B: FnOnce(F::Output) -> Fut + Send,
    Fut: Future<Output = ShopResult<T>> + Send,
    T: Send,
{
    let output = fixture.setup().await?;
    let outcome = AssertUnwindSafe(body(output)).catch_unwind().await;
    let teardown = fixture.teardown().await;

    match outcome {
        Err(panic) => {
            if let Err(err) = teardown {
                tracing::warn!(fixture = fixture.name(), error = %err, "teardown after panic failed");
            }
            std::panic::resume_unwind(panic)
        }
        Ok(Err(err)) => {
            if let Err(teardown_err) = teardown {
                tracing::warn!(
                    fixture = fixture.name(),
                    error = %teardown_err,
                    "teardown after failed body failed"
                );
            }
            Err(err)
        }
        Ok(Ok(value)) => teardown.map(|()| value),
    }
}

/// Run `body` with a signed-in document
pub async fn with_authenticated_page<B, Fut, T>(
    launcher: Arc<dyn BrowserLauncher>,
    config: ShopConfig,
    body: B,
) -> ShopResult<T>
where
    B: FnOnce(Document) -> Fut + Send,
    Fut: Future<Output = ShopResult<T>> + Send,
    T: Send,
{
    run_fixture(AuthenticatedPage::new(launcher, config), body).await
}

/// Run `body` with every page object over a signed-in document
pub async fn with_pages<B, Fut, T>(
    launcher: Arc<dyn BrowserLauncher>,
    config: ShopConfig,
    body: B,
) -> ShopResult<T>
where
    B: FnOnce(Pages) -> Fut + Send,
    Fut: Future<Output = ShopResult<T>> + Send,
    T: Send,
{
    run_fixture(PagesFixture::new(launcher, config), body).await
}

/// Run one named test step; a failure is reported under the step's name
pub async fn step<Fut, T>(name: &str, fut: Fut) -> ShopResult<T>
where
    Fut: Future<Output = ShopResult<T>>,
{
    tracing::info!(step = name, "step");
    fut.await.map_err(|source| {
        tracing::debug!(step = name, error = %source, "step failed");
        ShopError::Step {
            name: name.to_string(),
            source: Box::new(source),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::mock::{MockBrowser, LOCKED_OUT_USER, PASSWORD};
    use crate::result::ErrorKind;

    fn launcher(browser: &MockBrowser) -> Arc<dyn BrowserLauncher> {
        Arc::new(browser.clone())
    }

    mod lifecycle_tests {
        use super::*;

        #[tokio::test]
        async fn test_states() {
            let browser = MockBrowser::new();
            let mut fixture = AuthenticatedPage::new(launcher(&browser), ShopConfig::default());
            assert_eq!(fixture.state(), FixtureState::Registered);

            let document = fixture.setup().await.unwrap();
            assert_eq!(fixture.state(), FixtureState::SetUp);
            assert!(fixture.session().is_some());
            assert_eq!(document.current_path().await.unwrap(), "/inventory.html");
            assert_eq!(browser.open_sessions(), 1);

            fixture.teardown().await.unwrap();
            fixture.teardown().await.unwrap();
            assert_eq!(fixture.state(), FixtureState::TornDown);
            assert_eq!(browser.open_sessions(), 0);
        }

        #[tokio::test]
        async fn test_locked_out_user_fails_setup() {
            let browser = MockBrowser::new();
            let config = ShopConfig::default()
                .with_credentials(Credentials::new(LOCKED_OUT_USER, PASSWORD))
                .with_login_timeout(200);
            let mut fixture = AuthenticatedPage::new(launcher(&browser), config);

            let err = fixture.setup().await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Fixture);
            assert_eq!(err.root_cause().kind(), ErrorKind::WaitTimeout);
            assert_eq!(fixture.state(), FixtureState::Failed);
            assert_eq!(browser.sessions_opened(), 1);
            assert_eq!(browser.open_sessions(), 0);
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_body_value_returned() {
            let browser = MockBrowser::new();
            let count = with_pages(launcher(&browser), ShopConfig::default(), |pages| async move {
                Ok(pages.products_page().get_product_cards().await?.len())
            })
            .await
            .unwrap();
            assert_eq!(count, 6);
            assert_eq!(browser.open_sessions(), 0);
        }

        #[tokio::test]
        async fn test_body_error_still_tears_down() {
            let browser = MockBrowser::new();
            let err = with_authenticated_page(
                launcher(&browser),
                ShopConfig::default(),
                |_document| async move { Err::<(), _>(ShopError::not_found("Product", "Gizmo")) },
            )
            .await
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
            assert_eq!(browser.open_sessions(), 0);
        }
    }

    mod step_tests {
        use super::*;

        #[tokio::test]
        async fn test_step_wraps_failure() {
            let err = step("add backpack", async {
                Err::<(), _>(ShopError::not_found("Product", "Backpack"))
            })
            .await
            .unwrap_err();
            assert!(matches!(err, ShopError::Step { ref name, .. } if name == "add backpack"));
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }

        #[tokio::test]
        async fn test_step_passes_value_through() {
            assert_eq!(step("answer", async { Ok(42) }).await.unwrap(), 42);
        }
    }
}
