//! Shareable link service — issue, validate and count capability links.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use vitrina_core::clock::Clock;
use vitrina_core::error::{VitrinaError, VitrinaResult};
use vitrina_core::models::shared_link::{CreateSharedLink, SharedLink};
use vitrina_core::repository::SharedLinkRepository;

use crate::config::ShareConfig;
use crate::link::{GenerateLink, LinkRejection, LinkValidation};
use crate::token;

/// Shareable link manager.
///
/// Generic over the link repository and the clock used for expiry, so
/// tests can drive time explicitly.
pub struct ShareableLinkService<L: SharedLinkRepository, K: Clock> {
    links: L,
    clock: K,
    config: ShareConfig,
}

impl<L: SharedLinkRepository, K: Clock> ShareableLinkService<L, K> {
    pub fn new(links: L, clock: K, config: ShareConfig) -> Self {
        Self {
            links,
            clock,
            config,
        }
    }

    /// Issue a new link to `module_type` on behalf of `issuer_id`.
    ///
    /// A gated link without a code is rejected; any supplied code,
    /// even an empty one, is stored as given. An access code supplied
    /// for an ungated link is dropped.
    pub async fn generate_link(
        &self,
        module_type: &str,
        issuer_id: &str,
        input: GenerateLink,
    ) -> VitrinaResult<SharedLink> {
        let module_type = module_type.trim();
        if module_type.is_empty() {
            return Err(VitrinaError::validation("module type must not be empty"));
        }
        if issuer_id.trim().is_empty() {
            return Err(VitrinaError::validation("issuer id must not be empty"));
        }

        let access_code = if input.requires_code {
            let code = input
                .access_code
                .ok_or_else(|| VitrinaError::validation("access code is required"))?;
            if self.check_access_code(&code).is_err() {
                warn!(
                    link_type = module_type,
                    min = self.config.min_access_code_length,
                    "issuing link with a short access code"
                );
            }
            Some(code)
        } else {
            None
        };

        let now = self.clock.now();
        let link = self
            .links
            .create(CreateSharedLink {
                token: token::generate_token(),
                link_type: module_type.to_string(),
                created_by: issuer_id.to_string(),
                created_at: now,
                expires_at: input.expiry.expires_at(now),
                requires_code: input.requires_code,
                access_code,
            })
            .await?;

        info!(
            link_id = %link.id,
            link_type = %link.link_type,
            expires_at = ?link.expires_at,
            requires_code = link.requires_code,
            "shared link issued"
        );
        Ok(link)
    }

    /// Check `token` for use with `module_type`.
    ///
    /// Rejections are returned as [`LinkValidation::Invalid`]; only store
    /// failures surface as errors. `module_type` is trimmed as it is at
    /// issue.
    pub async fn validate_token(
        &self,
        token: &str,
        module_type: &str,
        supplied_code: Option<&str>,
    ) -> VitrinaResult<LinkValidation> {
        if !token::is_well_formed(token) {
            debug!("malformed link token");
            return Ok(LinkRejection::NotFound.into());
        }

        let link = match self.links.get_by_token(token).await {
            Ok(link) => link,
            Err(VitrinaError::NotFound { .. }) => return Ok(LinkRejection::NotFound.into()),
            Err(e) => return Err(e),
        };

        let validation = check_link(&link, module_type.trim(), supplied_code, self.clock.now());
        if let Some(reason) = validation.rejection() {
            warn!(link_id = %link.id, %reason, "shared link rejected");
        }
        Ok(validation)
    }

    /// Count one use of `token`. The increment happens inside the store.
    pub async fn record_usage(&self, token: &str) -> VitrinaResult<()> {
        self.links.increment_usage(token).await?;
        debug!("shared link usage recorded");
        Ok(())
    }

    /// Validate `token` and, if it is accepted, record one use.
    pub async fn redeem(
        &self,
        token: &str,
        module_type: &str,
        supplied_code: Option<&str>,
    ) -> VitrinaResult<LinkValidation> {
        let validation = self.validate_token(token, module_type, supplied_code).await?;
        if validation.is_valid() {
            self.record_usage(token).await?;
        }
        Ok(validation)
    }

    pub async fn get_link(&self, token: &str) -> VitrinaResult<SharedLink> {
        self.links.get_by_token(token).await
    }

    /// Links issued for `module_type`, newest first.
    pub async fn list_links(&self, module_type: &str) -> VitrinaResult<Vec<SharedLink>> {
        self.links.list_by_type(module_type.trim()).await
    }

    /// Enforce the configured minimum access code length.
    pub fn check_access_code(&self, code: &str) -> VitrinaResult<()> {
        if code.chars().count() < self.config.min_access_code_length {
            return Err(VitrinaError::validation(format!(
                "access code must be at least {} characters",
                self.config.min_access_code_length
            )));
        }
        Ok(())
    }
}

fn check_link(
    link: &SharedLink,
    module_type: &str,
    supplied_code: Option<&str>,
    now: DateTime<Utc>,
) -> LinkValidation {
    if link.link_type != module_type {
        return LinkRejection::WrongType.into();
    }
    if link.is_expired_at(now) {
        return LinkRejection::Expired.into();
    }
    if link.requires_code {
        let accepted = match (supplied_code, link.access_code.as_deref()) {
            (Some(supplied), Some(expected)) => token::codes_match(supplied, expected),
            _ => false,
        };
        if !accepted {
            return LinkRejection::BadCode.into();
        }
    }
    LinkValidation::Valid
}
