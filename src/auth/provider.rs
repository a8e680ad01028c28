use crate::config::{AuthConfig, OauthClientConfig};
use crate::error::LintBaseError;
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::{
    AuthUrl, Client as OAuth2Client, ClientId, ClientSecret, EmptyExtraTokenFields, RedirectUrl,
    Scope, StandardRevocableToken, StandardTokenResponse, TokenUrl,
};
use std::fmt;
use std::str::FromStr;
use url::Url;

pub type OauthTokenResponse = StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>;

/// A standard OAuth2 client with authorization and token endpoints set.
pub type StandardOauth2Client<
    HasAuthUrl = oauth2::EndpointSet,
    HasDeviceAuthUrl = oauth2::EndpointNotSet,
    HasIntrospectionUrl = oauth2::EndpointNotSet,
    HasRevocationUrl = oauth2::EndpointNotSet,
    HasTokenUrl = oauth2::EndpointSet,
> = OAuth2Client<
    BasicErrorResponse,
    OauthTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    HasAuthUrl,
    HasDeviceAuthUrl,
    HasIntrospectionUrl,
    HasRevocationUrl,
    HasTokenUrl,
>;

/// Identity providers users can sign in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Github,
    Discord,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Github => "github",
            Provider::Discord => "discord",
        }
    }

    fn auth_url(self) -> &'static str {
        match self {
            Provider::Github => "https://github.com/login/oauth/authorize",
            Provider::Discord => "https://discord.com/oauth2/authorize",
        }
    }

    fn token_url(self) -> &'static str {
        match self {
            Provider::Github => "https://github.com/login/oauth/access_token",
            Provider::Discord => "https://discord.com/api/oauth2/token",
        }
    }

    /// `repo` lets refreshes read private repositories with the user's own token.
    pub fn scopes(self) -> Vec<Scope> {
        let scopes: &[&str] = match self {
            Provider::Github => &["read:user", "user:email", "repo"],
            Provider::Discord => &["identify", "email"],
        };
        scopes.iter().map(|s| Scope::new((*s).to_string())).collect()
    }

    pub fn credentials(self, auth: &AuthConfig) -> &OauthClientConfig {
        match self {
            Provider::Github => &auth.github,
            Provider::Discord => &auth.discord,
        }
    }

    /// `{public_url}/auth/{provider}/callback`; must match the provider app registration.
    pub fn redirect_url(self, public_url: &Url) -> Result<RedirectUrl, LintBaseError> {
        let mut url = public_url.clone();
        url.path_segments_mut()
            .map_err(|_| LintBaseError::UnexpectedError(format!("invalid public url: {public_url}")))?
            .pop_if_empty()
            .extend(["auth", self.as_str(), "callback"]);
        Ok(RedirectUrl::from_url(url))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = LintBaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(Provider::Github),
            "discord" => Ok(Provider::Discord),
            _ => Err(LintBaseError::not_found("Sign-in provider")),
        }
    }
}

/// Builds the authorization-code client of `provider`, or fails when its
/// client id/secret pair is not configured.
pub fn build_oauth2_client(
    provider: Provider,
    auth: &AuthConfig,
    public_url: &Url,
) -> Result<StandardOauth2Client, LintBaseError> {
    let creds = provider.credentials(auth);
    if !creds.is_configured() {
        return Err(LintBaseError::UpstreamNotConfigured(match provider {
            Provider::Github => "GitHub sign-in",
            Provider::Discord => "Discord sign-in",
        }));
    }

    let client = OAuth2Client::<
        BasicErrorResponse,
        OauthTokenResponse,
        BasicTokenIntrospectionResponse,
        StandardRevocableToken,
        BasicRevocationErrorResponse,
    >::new(ClientId::new(creds.client_id.clone()))
    .set_client_secret(ClientSecret::new(creds.client_secret.clone()))
    .set_auth_uri(AuthUrl::new(provider.auth_url().to_string())?)
    .set_token_uri(TokenUrl::new(provider.token_url().to_string())?)
    .set_redirect_uri(provider.redirect_url(public_url)?);

    Ok(client)
}
