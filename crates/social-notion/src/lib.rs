//! Notion OAuth 2.0 social login driver.
//!
//! Notion's authorization-code flow deviates from the generic shape in three
//! ways this crate reproduces: the token exchange wants the client
//! credentials Basic-encoded in the `Authorization` header (never in the
//! body) with a JSON body, every API call must pin an explicit
//! `Notion-Version`, and there are no OAuth scopes at all; integration
//! capabilities are configured on the integration itself. The token owner
//! comes back wrapped as a bot-integration record, so the profile of
//! interest sits at `bot.owner.user` in the user-info envelope.

mod driver;

pub use driver::{register, NotionDriver, STATE_COOKIE_NAME};
