use crate::vault::expiration::ExpiryKind;
use tracing::info;
use uuid::Uuid;

/// Something that happened to a user's vault, emitted by write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    PasswordCreated { id: Uuid, name: String },
    PasswordGenerated { name: String },
    PasswordUpdated { id: Uuid, name: String },
    PasswordDeleted { name: String },
    RecordCreated { kind: RecordKind, id: Uuid },
    RecordUpdated { kind: RecordKind, id: Uuid },
    RecordDeleted { kind: RecordKind, id: Uuid },
    ExpirationNotified { kind: ExpiryKind, record_id: Uuid },
    IdentityExpired { id: Uuid },
    IdentityExpiringSoon { id: Uuid },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Login,
    CreditCard,
    Identity,
    SecureNote,
}

impl RecordKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::CreditCard => "credit_card",
            Self::Identity => "identity",
            Self::SecureNote => "secure_note",
        }
    }
}

impl VaultEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PasswordCreated { .. } => "password_created",
            Self::PasswordGenerated { .. } => "password_generated",
            Self::PasswordUpdated { .. } => "password_updated",
            Self::PasswordDeleted { .. } => "password_deleted",
            Self::RecordCreated { .. } => "record_created",
            Self::RecordUpdated { .. } => "record_updated",
            Self::RecordDeleted { .. } => "record_deleted",
            Self::ExpirationNotified { .. } => "expiration_notified",
            Self::IdentityExpired { .. } => "identity_expired",
            Self::IdentityExpiringSoon { .. } => "identity_expiring_soon",
        }
    }
}

pub fn record(user_id: Uuid, events: &[VaultEvent]) {
    for event in events {
        match event {
            VaultEvent::PasswordCreated { id, name } | VaultEvent::PasswordUpdated { id, name } => {
                info!(%user_id, event = event.name(), record_id = %id, account_name = %name);
            }
            VaultEvent::PasswordGenerated { name } | VaultEvent::PasswordDeleted { name } => {
                info!(%user_id, event = event.name(), account_name = %name);
            }
            VaultEvent::RecordCreated { kind, id }
            | VaultEvent::RecordUpdated { kind, id }
            | VaultEvent::RecordDeleted { kind, id } => {
                info!(%user_id, event = event.name(), record_kind = kind.as_str(), record_id = %id);
            }
            VaultEvent::ExpirationNotified { kind, record_id } => {
                info!(
                    %user_id,
                    event = event.name(),
                    expiry_kind = kind.as_str(),
                    record_id = %record_id
                );
            }
            VaultEvent::IdentityExpired { id } | VaultEvent::IdentityExpiringSoon { id } => {
                info!(%user_id, event = event.name(), record_id = %id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        let id = Uuid::new_v4();
        assert_eq!(
            VaultEvent::PasswordCreated {
                id,
                name: "mail".into()
            }
            .name(),
            "password_created"
        );
        assert_eq!(
            VaultEvent::PasswordDeleted { name: "mail".into() }.name(),
            "password_deleted"
        );
        assert_eq!(
            VaultEvent::ExpirationNotified {
                kind: ExpiryKind::Passport,
                record_id: id
            }
            .name(),
            "expiration_notified"
        );
    }

    #[test]
    fn record_accepts_every_variant() {
        let id = Uuid::new_v4();
        record(
            Uuid::new_v4(),
            &[
                VaultEvent::PasswordGenerated { name: "x".into() },
                VaultEvent::RecordDeleted {
                    kind: RecordKind::SecureNote,
                    id,
                },
                VaultEvent::IdentityExpiringSoon { id },
            ],
        );
    }
}
