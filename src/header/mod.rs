// header/mod.rs

//! State of the configuration-aware header.
//!
//! The header is mounted once when the screen is first displayed. Mounting
//! hands out a [`MountToken`] that travels with the configuration request to
//! the backend thread. When the response comes back it is applied only if the
//! token still designates the current mount, so a response arriving after
//! [`ConfigAwareHeader::unmount`] is dropped.

use log::*;
use std::sync::Arc;
use tokio::sync::watch;

use crate::backend::client::{ConfigResponse, FetchError};

/// Fixed label rendered inside the header.
pub const TITLE_TEXT: &str = "Cool Crazy App on K8S";

/// Identifier of one mount of the header.
pub type MountId = u64;

/// Style override computed from the configured mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderStyle {
    /// Background color, the `mode` string used verbatim.
    pub background_color: String,
}

/// Cancellation token tied to one mount of the header.
#[derive(Clone, Debug)]
pub struct MountToken {
    id: MountId,
    cancelled: Arc<watch::Sender<bool>>,
}

impl MountToken {
    fn new(id: MountId) -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            id,
            cancelled: Arc::new(cancelled),
        }
    }

    pub fn id(&self) -> MountId {
        self.id
    }

    /// Marks the mount as gone. Shared by all clones of the token.
    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Completes once the mount is gone.
    pub async fn cancelled(&self) {
        let mut rx = self.cancelled.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

#[derive(Debug)]
struct Mount {
    token: MountToken,
    resolved: bool,
}

/// What happened to a configuration result handed to the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigOutcome {
    /// The mode was stored (possibly `None`).
    Applied,
    /// The fetch failed, the header keeps no override.
    Failed,
    /// The result belongs to a mount that is gone or already resolved.
    Stale,
}

/// Header whose background color comes from the backend configuration.
#[derive(Debug, Default)]
pub struct ConfigAwareHeader {
    mode: Option<String>,
    mount: Option<Mount>,
    last_mount_id: MountId,
}

impl ConfigAwareHeader {
    /// Mounts the header and returns the token of the new mount.
    /// A header that is already mounted is unmounted first.
    pub fn mount(&mut self) -> MountToken {
        if self.is_mounted() {
            warn!("Header mounted twice, dropping the previous mount");
            self.unmount();
        }
        self.last_mount_id += 1;
        let token = MountToken::new(self.last_mount_id);
        debug!("Mounting header #{}", token.id());
        self.mount = Some(Mount {
            token: token.clone(),
            resolved: false,
        });
        token
    }

    /// Unmounts the header: cancels the pending request, if any, and
    /// forgets the mode.
    pub fn unmount(&mut self) {
        if let Some(mount) = self.mount.take() {
            debug!("Unmounting header #{}", mount.token.id());
            mount.token.cancel();
        }
        self.mode = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }

    /// Returns the mode received from the backend, if any.
    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }

    /// Computes the style override: the mode as background color,
    /// or `None` when no mode is known.
    pub fn style(&self) -> Option<HeaderStyle> {
        self.mode.as_ref().map(|mode| HeaderStyle {
            background_color: mode.clone(),
        })
    }

    /// Applies the result of the configuration fetch started by the mount
    /// identified by `token`.
    ///
    /// Each mount stores a result at most once. Failures are logged and leave
    /// the header without override.
    pub fn on_config_loaded(
        &mut self,
        token: &MountToken,
        result: Result<ConfigResponse, FetchError>,
    ) -> ConfigOutcome {
        let mount = match self.mount.as_mut() {
            Some(mount) if mount.token.id() == token.id() && !token.is_cancelled() => mount,
            _ => {
                debug!(
                    "Ignoring configuration for header #{} which is no longer mounted",
                    token.id()
                );
                return ConfigOutcome::Stale;
            }
        };
        if mount.resolved {
            debug!("Header #{} already has its configuration", token.id());
            return ConfigOutcome::Stale;
        }
        mount.resolved = true;

        match result {
            Ok(config) => {
                match &config.mode {
                    Some(mode) => info!("Header mode set to {:?}", mode),
                    None => info!("No mode configured, header keeps default style"),
                }
                self.mode = config.mode;
                ConfigOutcome::Applied
            }
            Err(e) => {
                warn!("Could not load configuration: {}", e);
                ConfigOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config(mode: Option<&str>) -> Result<ConfigResponse, FetchError> {
        Ok(ConfigResponse {
            mode: mode.map(String::from),
        })
    }

    fn decode_failure() -> Result<ConfigResponse, FetchError> {
        Err(serde_json::from_str::<ConfigResponse>("not json")
            .unwrap_err()
            .into())
    }

    #[test]
    fn test_unmounted_header_has_no_style() {
        let header = ConfigAwareHeader::default();
        assert!(!header.is_mounted());
        assert_eq!(header.style(), None);
    }

    #[rstest]
    #[case("red")]
    #[case("#282a36")]
    #[case("Blue")]
    #[case("not-a-color")]
    fn test_style_uses_mode_verbatim(#[case] mode: &str) {
        let mut header = ConfigAwareHeader::default();
        let token = header.mount();
        assert_eq!(header.style(), None);

        let outcome = header.on_config_loaded(&token, config(Some(mode)));
        assert_eq!(outcome, ConfigOutcome::Applied);
        assert_eq!(
            header.style(),
            Some(HeaderStyle {
                background_color: mode.to_string()
            })
        );
    }

    #[test]
    fn test_null_mode_keeps_no_style() {
        let mut header = ConfigAwareHeader::default();
        let token = header.mount();
        assert_eq!(
            header.on_config_loaded(&token, config(None)),
            ConfigOutcome::Applied
        );
        assert_eq!(header.mode(), None);
        assert_eq!(header.style(), None);
    }

    #[test]
    fn test_failed_fetch_keeps_no_style() {
        let mut header = ConfigAwareHeader::default();
        let token = header.mount();
        assert_eq!(
            header.on_config_loaded(&token, decode_failure()),
            ConfigOutcome::Failed
        );
        assert_eq!(header.style(), None);
        assert!(header.is_mounted());
    }

    #[test]
    fn test_late_response_after_unmount_is_ignored() {
        let mut header = ConfigAwareHeader::default();
        let token = header.mount();
        header.unmount();
        assert!(token.is_cancelled());

        assert_eq!(
            header.on_config_loaded(&token, config(Some("red"))),
            ConfigOutcome::Stale
        );
        assert_eq!(header.style(), None);
    }

    #[test]
    fn test_response_for_previous_mount_is_ignored() {
        let mut header = ConfigAwareHeader::default();
        let first = header.mount();
        let second = header.mount();
        assert!(first.is_cancelled());
        assert_ne!(first.id(), second.id());

        assert_eq!(
            header.on_config_loaded(&first, config(Some("red"))),
            ConfigOutcome::Stale
        );
        assert_eq!(
            header.on_config_loaded(&second, config(Some("green"))),
            ConfigOutcome::Applied
        );
        assert_eq!(header.mode(), Some("green"));
    }

    #[test]
    fn test_mode_is_stored_once_per_mount() {
        let mut header = ConfigAwareHeader::default();
        let token = header.mount();
        header.on_config_loaded(&token, config(Some("red")));
        assert_eq!(
            header.on_config_loaded(&token, config(Some("blue"))),
            ConfigOutcome::Stale
        );
        assert_eq!(header.mode(), Some("red"));
    }

    #[tokio::test]
    async fn test_cancelled_completes_on_unmount() {
        let mut header = ConfigAwareHeader::default();
        let token = header.mount();
        let waiter = token.clone();
        let wait = tokio::spawn(async move { waiter.cancelled().await });
        tokio::task::yield_now().await;
        assert!(!wait.is_finished());

        header.unmount();
        tokio::time::timeout(std::time::Duration::from_secs(1), wait)
            .await
            .expect("cancellation wakes the waiter")
            .unwrap();

        // Already cancelled tokens complete right away
        token.cancelled().await;
    }

    #[test]
    fn test_unmount_forgets_mode() {
        let mut header = ConfigAwareHeader::default();
        let token = header.mount();
        header.on_config_loaded(&token, config(Some("red")));
        header.unmount();
        assert!(!header.is_mounted());
        assert_eq!(header.style(), None);
    }
}
