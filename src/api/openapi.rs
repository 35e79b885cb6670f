use super::handlers::{
    auth::{account, login, recovery, register, session},
    health, notifications,
    vault::{credit_cards, home, identities, logins, notes, passwords},
};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Handlers sharing a path go in one `routes!` call. Routes added outside
/// (like `/`) are not documented.
pub(crate) fn api_router() -> OpenApiRouter {
    let mut router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(register::register))
        .routes(routes!(login::login))
        .routes(routes!(session::logout))
        .routes(routes!(account::account))
        .routes(routes!(account::change_password))
        .routes(routes!(recovery::start))
        .routes(routes!(recovery::answer))
        .routes(routes!(recovery::reset))
        .routes(routes!(home::home))
        .routes(routes!(
            passwords::list_passwords,
            passwords::create_password
        ))
        .routes(routes!(
            passwords::update_password,
            passwords::delete_password
        ))
        .routes(routes!(logins::list, logins::create))
        .routes(routes!(logins::detail, logins::update, logins::delete))
        .routes(routes!(credit_cards::list, credit_cards::create))
        .routes(routes!(
            credit_cards::detail,
            credit_cards::update,
            credit_cards::delete
        ))
        .routes(routes!(identities::list, identities::create))
        .routes(routes!(
            identities::detail,
            identities::update,
            identities::delete
        ))
        .routes(routes!(notes::list, notes::create))
        .routes(routes!(notes::detail, notes::update, notes::delete))
        .routes(routes!(notifications::list_notifications))
        .routes(routes!(notifications::mark_notification_read));

    router.get_openapi_mut().tags = Some(vec![
        tag("health", "Liveness and build information"),
        tag("auth", "Registration, login and logout"),
        tag("account", "Signed-in account settings"),
        tag("recovery", "Security-question password recovery"),
        tag("vault", "Saved passwords, logins, cards, identities and notes"),
        tag("notifications", "Expiration notices"),
    ]);

    router
}

fn tag(name: &str, description: &str) -> Tag {
    let mut tag = Tag::new(name);
    tag.description = Some(description.to_string());
    tag
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = cargo_license();

    OpenApiBuilder::new().info(info).build()
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let primary = authors.split(';').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    Some(value.trim()).filter(|trimmed| !trimmed.is_empty())
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    fn non_empty(value: &str) -> Option<&str> {
        Some(value.trim()).filter(|value| !value.is_empty())
    }

    match author.split_once('<') {
        Some((name, email)) => (non_empty(name), non_empty(email.trim_end_matches('>'))),
        None => (non_empty(author), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));

        let contact = spec.info.contact;
        assert!(contact.is_some());
        if let Some(contact) = contact {
            assert_eq!(contact.name.as_deref(), Some("Team MyPass"));
            assert_eq!(contact.email.as_deref(), Some("team@mypass.dev"));
        }

        let license = spec.info.license;
        assert!(license.is_some_and(|license| license.name == "BSD-3-Clause"));
    }

    #[test]
    fn openapi_tags_and_paths() {
        let spec = openapi();
        let tags = spec.tags.clone().unwrap_or_default();
        for name in ["auth", "vault", "recovery", "notifications"] {
            assert!(tags.iter().any(|tag| tag.name == name), "missing tag {name}");
        }
        for path in [
            "/health",
            "/v1/auth/login",
            "/v1/auth/recovery/answer",
            "/v1/vault",
            "/v1/vault/passwords/{id}",
            "/v1/vault/identities/{id}",
            "/v1/notifications/{id}/read",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn author_parsing() {
        assert_eq!(
            parse_author("Team MyPass <team@mypass.dev>"),
            (Some("Team MyPass"), Some("team@mypass.dev"))
        );
        assert_eq!(parse_author("Solo"), (Some("Solo"), None));
        assert_eq!(
            parse_author("  Padded  < pad@mypass.dev >"),
            (Some("Padded"), Some("pad@mypass.dev"))
        );
        assert_eq!(parse_author("<only@mail>"), (None, Some("only@mail")));
    }
}
