// Cookie names and builders for the session and the active team

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;
use uuid::Uuid;

use crate::config::AppConfig;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const ACTIVE_TEAM_COOKIE: &str = "selectedTeamId";

const ACTIVE_TEAM_MAX_AGE_DAYS: i64 = 30;

/// Builds every cookie the API sets, with attributes taken from config
pub struct CookieBuilder {
    secure: bool,
    access_token_hours: i64,
}

impl CookieBuilder {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            secure: config.cookie_secure,
            access_token_hours: config.jwt_expiry_hours,
        }
    }

    fn base(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        let mut cookie = Cookie::new(name, value);
        cookie.set_path("/");
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(max_age);
        cookie
    }

    /// HttpOnly cookie carrying the JWT, living as long as the token
    pub fn access_token(&self, token: String) -> Cookie<'static> {
        let mut cookie = self.base(
            ACCESS_TOKEN_COOKIE,
            token,
            Duration::hours(self.access_token_hours),
        );
        cookie.set_http_only(true);
        cookie
    }

    /// Readable by the client so it can highlight the selected team
    pub fn active_team(&self, team_id: Uuid) -> Cookie<'static> {
        self.base(
            ACTIVE_TEAM_COOKIE,
            team_id.to_string(),
            Duration::days(ACTIVE_TEAM_MAX_AGE_DAYS),
        )
    }

    pub fn expired(&self, name: &'static str) -> Cookie<'static> {
        self.base(name, String::new(), Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_team_cookie_attributes() {
        let cookie = CookieBuilder::from_config(&AppConfig::default()).active_team(Uuid::nil());

        assert_eq!(cookie.name(), ACTIVE_TEAM_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(Duration::days(30)));
        assert_ne!(cookie.http_only(), Some(true));
    }

    #[test]
    fn access_token_cookie_is_http_only() {
        let config = AppConfig {
            cookie_secure: true,
            ..AppConfig::default()
        };
        let cookie = CookieBuilder::from_config(&config).access_token("jwt".to_string());

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::hours(8)));
    }
}
