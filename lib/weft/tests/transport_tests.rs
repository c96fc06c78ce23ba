//! Woven clients over a tower service stack.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use assert2::{check, let_assert};
use weft::middleware::{LoggingLayer, ServiceBuilder};
use weft::{Error, Request, Response, ServiceTransport, StatusCode, TransportConfig};

#[weft::weave]
mod notes {
    pub(crate) struct NotesApi {
        pub(crate) transport: weft::ServiceTransport,
    }

    impl NotesApi {
        #[transport]
        fn transport(&self) -> &weft::ServiceTransport {
            &self.transport
        }

        #[get("notes/{id}")]
        pub(crate) async fn note(&self, id: u32) -> weft::Result<String>;

        #[http("GET /notes")]
        pub(crate) async fn all(&self) -> weft::Result<String>;

        #[post("notes")]
        #[header("Accept", "text/plain")]
        pub(crate) fn create(&self, #[body] text: String) -> weft::Task<'_, weft::StatusCode>;
    }
}

use notes::NotesApi;

type Sent = Arc<Mutex<Vec<Request>>>;

/// A service recording requests and answering with the request URL.
fn notes_api(sent: &Sent, status: StatusCode, config: TransportConfig) -> NotesApi {
    let sent = Arc::clone(sent);
    let service = tower::service_fn(move |request: Request| {
        let body = request.uri().to_string();
        sent.lock().expect("lock").push(request);
        async move { Ok::<_, Error>(Response::new(status, HashMap::new(), body.into())) }
    });
    let service = ServiceBuilder::new().layer(LoggingLayer::debug()).service(service);

    let transport = ServiceTransport::with_config(service, "https://notes.example.com/api", config)
        .expect("valid base URL");
    NotesApi { transport }
}

#[tokio::test]
async fn requests_are_resolved_against_the_base_url() {
    let sent = Sent::default();
    let api = notes_api(&sent, StatusCode::OK, TransportConfig::default());

    let result = api.note(7).await;
    let_assert!(Ok(url) = result);
    check!(url == "https://notes.example.com/api/notes/7");

    let requests = sent.lock().expect("lock");
    let_assert!([request] = requests.as_slice());
    check!(request.header("User-Agent") == Some(weft::DEFAULT_USER_AGENT));
}

#[tokio::test]
async fn rooted_templates_keep_the_base_path() {
    let sent = Sent::default();
    let api = notes_api(&sent, StatusCode::OK, TransportConfig::default());

    let result = api.all().await;
    let_assert!(Ok(url) = result);
    check!(url == "https://notes.example.com/api/notes");
}

#[tokio::test]
async fn default_headers_do_not_override_method_headers() {
    let sent = Sent::default();
    let config = TransportConfig::builder()
        .user_agent("notes-cli/1.0")
        .default_header("Accept", "application/json")
        .default_header("X-Client", "tests")
        .build();
    let api = notes_api(&sent, StatusCode::CREATED, config);

    let result = api.create("remember the milk".to_string()).await;
    let_assert!(Ok(status) = result);
    check!(status == StatusCode::CREATED);

    let requests = sent.lock().expect("lock");
    let_assert!([request] = requests.as_slice());
    check!(request.header("Accept") == Some("text/plain"));
    check!(request.header("X-Client") == Some("tests"));
    check!(request.header("User-Agent") == Some("notes-cli/1.0"));
    check!(request.body().map(|body| body.as_ref()) == Some(b"remember the milk".as_slice()));
}

#[tokio::test]
async fn gated_failures_carry_the_response() {
    let sent = Sent::default();
    let api = notes_api(&sent, StatusCode::SERVICE_UNAVAILABLE, TransportConfig::default());

    let result = api.note(1).await;
    let_assert!(Err(Error::Rest(rest)) = result);
    check!(rest.status() == StatusCode::SERVICE_UNAVAILABLE);
    insta::assert_snapshot!(rest, @"503 - Service Unavailable");
}
