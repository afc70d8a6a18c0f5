//! Keeps policies consistent with the user-defined signatures they require.
//!
//! A tag may be owned by at most one user signature: the oldest wins, and every other signature
//! with that tag is rejected. A policy that requires a tag is valid only while a valid signature
//! with that tag (and an acceptable revision time) is indexed.

use crate::{store::Updates, AnyResource, Policy, Reason, Store};
use ahash::AHashSet as HashSet;
use appprotect_controller_core::ResourceKey;
use tracing::debug;

impl Store {
    /// Returns the reason `policy` is unusable with the currently indexed user signatures.
    pub(crate) fn check_signature_requirements(&self, policy: &Policy) -> Option<Reason> {
        let satisfied = policy.signature_requirements.iter().all(|req| {
            self.user_sigs
                .values()
                .any(|sig| sig.is_valid() && sig.spec().is_some_and(|s| s.satisfies(req)))
        });
        (!satisfied).then_some(Reason::UnsatisfiedSignatureRequirements)
    }

    /// Re-evaluates tag ownership and dependent policies after a user signature was added, updated,
    /// or deleted.
    ///
    /// The touched signature, if it is still indexed, is reported first.
    pub(crate) fn user_sigs_changed(&mut self, touched: Option<&ResourceKey>, updates: &mut Updates) {
        let flipped = self.resolve_user_sig_tags();

        if let Some(sig) = touched.and_then(|key| self.user_sigs.get(key)) {
            if sig.error() == Some(Reason::DuplicateTag) {
                updates.rejected(sig.shared_obj(), Reason::DuplicateTag.to_string());
            }
            updates.changed(AnyResource::UserSig(sig.clone()));
        }

        for key in flipped {
            if Some(&key) == touched {
                continue;
            }
            let Some(sig) = self.user_sigs.get(&key) else {
                continue;
            };
            if let Some(reason) = sig.error() {
                updates.rejected(sig.shared_obj(), reason.to_string());
            }
            updates.changed(AnyResource::UserSig(sig.clone()));
        }

        self.reverify_policies(updates);
    }

    /// Assigns each non-empty tag to its oldest buildable signature, rejecting the rest.
    ///
    /// Returns the keys of signatures whose validity changed.
    fn resolve_user_sig_tags(&mut self) -> Vec<ResourceKey> {
        let mut candidates = self
            .user_sigs
            .iter()
            .filter_map(|(key, sig)| {
                let spec = sig.spec()?;
                if spec.tag.is_empty() {
                    return None;
                }
                match sig.error() {
                    None | Some(Reason::DuplicateTag) => {
                        Some((sig.creation_time(), key.clone(), spec.tag.clone()))
                    }
                    Some(_) => None,
                }
            })
            .collect::<Vec<_>>();
        candidates.sort();

        let mut owned = HashSet::new();
        let mut flipped = Vec::new();
        for (_, key, tag) in candidates {
            let error = if owned.insert(tag) {
                None
            } else {
                Some(Reason::DuplicateTag)
            };
            if let Some(sig) = self.user_sigs.get_mut(&key) {
                if sig.error() != error {
                    debug!(%key, ?error, "User signature tag ownership changed");
                    *sig = sig.with_error(error);
                    flipped.push(key);
                }
            }
        }
        flipped
    }

    /// Re-checks every policy with signature requirements, reporting those whose validity changed.
    fn reverify_policies(&mut self, updates: &mut Updates) {
        let mut keys = self
            .policies
            .iter()
            .filter(|(_, policy)| {
                matches!(
                    policy.error(),
                    None | Some(Reason::UnsatisfiedSignatureRequirements)
                ) && policy
                    .spec()
                    .is_some_and(|spec| !spec.signature_requirements.is_empty())
            })
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();
        keys.sort();

        for key in keys {
            let Some(policy) = self.policies.get(&key) else {
                continue;
            };
            let error = policy
                .spec()
                .and_then(|spec| self.check_signature_requirements(spec));
            if error == policy.error() {
                continue;
            }

            debug!(%key, ?error, "Policy signature requirements changed");
            let policy = policy.with_error(error);
            if let Some(reason) = error {
                updates.rejected(policy.shared_obj(), reason.to_string());
            }
            updates.changed(AnyResource::Policy(policy.clone()));
            self.policies.insert(key, policy);
        }
    }
}
