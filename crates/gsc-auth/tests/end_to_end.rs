mod support;

use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use gsc_auth::{Authenticator, HttpTokenExchanger, TokenStatus};
use mockito::{Matcher, Server};
use serde_json::json;
use support::{
    credentials, memory_store, port_is_closed, start_time, ManualClock, ProviderBrowser, Redirect,
};

#[tokio::test]
async fn login_inspect_expire_and_refresh() {
    let mut provider = Server::new_async().await;
    let exchange = provider
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            Matcher::UrlEncoded("code".into(), "AUTH123".into()),
            Matcher::UrlEncoded("client_id".into(), "abc".into()),
            Matcher::UrlEncoded("client_secret".into(), "xyz".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "tok1",
                "refresh_token": "ref1",
                "expires_in": 3600,
                "token_type": "Bearer"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let refresh = provider
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), "ref1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "tok2",
                "expires_in": 3600,
                "token_type": "Bearer"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let mut creds = credentials();
    creds.token_url = format!("{}/token", provider.url());

    let clock = ManualClock::new(start_time());
    let browser = ProviderBrowser::new(Redirect::Code("AUTH123"));
    let (_, store) = memory_store();
    let auth = Authenticator::new(store, reqwest::Client::new())
        .with_clock(clock.clone())
        .with_exchanger(Arc::new(HttpTokenExchanger::with_clock(
            reqwest::Client::new(),
            clock.clone(),
        )))
        .with_browser(browser.clone());

    let token = auth.login(&creds).await.expect("login");
    exchange.assert_async().await;
    assert_eq!(token.access_token, "tok1");
    assert_eq!(token.expiry, start_time() + ChronoDuration::seconds(3600));
    assert!(port_is_closed(browser.ports()[0]).await);

    assert!(matches!(
        auth.inspect().expect("inspect"),
        TokenStatus::Present { expired: false, .. }
    ));

    clock.advance(ChronoDuration::seconds(3601));
    assert!(matches!(
        auth.inspect().expect("inspect"),
        TokenStatus::Present { expired: true, .. }
    ));

    let refreshed = auth.valid_token(&creds).await.expect("valid token");
    refresh.assert_async().await;
    assert_eq!(refreshed.access_token, "tok2");
    assert_eq!(refreshed.refresh_token.as_deref(), Some("ref1"));
    assert!(refreshed.expiry > token.expiry);
    assert!(matches!(
        auth.inspect().expect("inspect"),
        TokenStatus::Present { expired: false, .. }
    ));
}
