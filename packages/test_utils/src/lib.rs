#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fake Socrata endpoint for tests.
//!
//! Runs an Actix-Web server on a random port bound to 127.0.0.1, on its own
//! thread and actix system, so it can be used from `#[tokio::test]` and
//! `#[actix_rt::test]` alike. Every request is recorded with its decoded
//! query parameters and answered with the configured [`Reply`].
//!
//! ```rust,no_run
//! use crime_explorer_test_utils::{FakeSocrata, Reply};
//!
//! let api = FakeSocrata::start(Reply::json("[]")).unwrap();
//! let url = api.resource_url();
//! // ...fetch `url`...
//! assert_eq!(api.hits(), 1);
//! ```

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError, mpsc};

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};

/// Path served by [`FakeSocrata::resource_url`].
pub const RESOURCE_PATH: &str = "/resource/test.json";

/// How the fake endpoint answers every request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// `200 OK` with a JSON body.
    Json(String),
    /// The given status code with a JSON body.
    Status(u16, String),
    /// Accept the request and never answer.
    Hang,
}

impl Reply {
    #[must_use]
    pub fn json(body: impl Into<String>) -> Self {
        Self::Json(body.into())
    }
}

/// A request as seen by the fake endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    /// Percent-decoded query parameters.
    pub query: BTreeMap<String, String>,
}

struct FakeState {
    reply: Reply,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Handle to the running fake endpoint. Dropping it stops the server.
pub struct FakeSocrata {
    addr: SocketAddr,
    handle: ServerHandle,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeSocrata {
    /// Starts the server and returns once it is listening.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the server
    /// thread exits before reporting its address.
    pub fn start(reply: Reply) -> std::io::Result<Self> {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = web::Data::new(FakeState {
            reply,
            requests: requests.clone(),
        });
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            actix_rt::System::new().block_on(async move {
                let bound = HttpServer::new(move || {
                    App::new()
                        .app_data(state.clone())
                        .default_service(web::to(respond))
                })
                .workers(1)
                .disable_signals()
                .bind(("127.0.0.1", 0));

                let server = match bound {
                    Ok(server) => server,
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        return;
                    }
                };
                let addr = server.addrs().first().copied();
                let running = server.run();
                let _ = tx.send(Ok((addr, running.handle())));

                if let Err(e) = running.await {
                    log::error!("Fake Socrata server failed: {e}");
                }
            });
        });

        let (addr, handle) = rx
            .recv()
            .map_err(|_| std::io::Error::other("fake server thread exited"))??;
        let addr = addr.ok_or_else(|| std::io::Error::other("fake server has no address"))?;
        log::debug!("Fake Socrata listening on {addr}");

        Ok(Self {
            addr,
            handle,
            requests,
        })
    }

    /// Base URL (e.g. `http://127.0.0.1:PORT`).
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL of the fake resource, suitable as a configured endpoint.
    #[must_use]
    pub fn resource_url(&self) -> String {
        format!("{}{RESOURCE_PATH}", self.base_url())
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for FakeSocrata {
    fn drop(&mut self) {
        // The stop command is sent eagerly; completion is not awaited.
        let _stopping = self.handle.stop(false);
    }
}

async fn respond(
    req: HttpRequest,
    query: web::Query<BTreeMap<String, String>>,
    state: web::Data<FakeState>,
) -> HttpResponse {
    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            path: req.path().to_string(),
            query: query.into_inner(),
        });

    match &state.reply {
        Reply::Json(body) => HttpResponse::Ok()
            .content_type("application/json")
            .body(body.clone()),
        Reply::Status(code, body) => {
            HttpResponse::build(StatusCode::from_u16(*code).unwrap_or(StatusCode::IM_A_TEAPOT))
                .content_type("application/json")
                .body(body.clone())
        }
        Reply::Hang => std::future::pending().await,
    }
}
