//! Listing requests over the Fetch API.
//!
//! Each request runs with its own `AbortController`, so a superseded
//! request can be cancelled by ticket.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gloo_net::http::{Request, Response};
use log::debug;
use suzuno_core::route::FetchRequest;
use suzuno_core::view::{FetchOutcome, FetchTicket, ResourceFetcher};
use suzuno_core::{FetchError, Listing};
use wasm_bindgen_futures::spawn_local;
use web_sys::{AbortController, AbortSignal};

use crate::utils::dom;

/// Receives every finished request, aborted ones included.
pub type CompletionFn = Rc<dyn Fn(FetchTicket, FetchOutcome)>;

/// [`ResourceFetcher`] that runs requests on the browser event loop.
pub struct HttpFetcher {
    on_complete: CompletionFn,
    controllers: Rc<RefCell<HashMap<FetchTicket, AbortController>>>,
}

impl HttpFetcher {
    pub fn new(on_complete: CompletionFn) -> Self {
        Self {
            on_complete,
            controllers: Rc::new(RefCell::new(HashMap::new())),
        }
    }
}

impl ResourceFetcher for HttpFetcher {
    fn fetch(&mut self, ticket: FetchTicket, request: FetchRequest) {
        let controller = AbortController::new().ok();
        let signal = controller.as_ref().map(AbortController::signal);
        if let Some(controller) = controller {
            self.controllers.borrow_mut().insert(ticket, controller);
        }

        let controllers = self.controllers.clone();
        let on_complete = self.on_complete.clone();
        spawn_local(async move {
            let outcome = fetch_listing(&request, signal.as_ref()).await;
            controllers.borrow_mut().remove(&ticket);
            on_complete(ticket, outcome);
        });
    }

    fn abort(&mut self, ticket: FetchTicket) {
        if let Some(controller) = self.controllers.borrow_mut().remove(&ticket) {
            debug!("aborting fetch {}", ticket.0);
            controller.abort();
        }
    }
}

async fn fetch_listing(
    request: &FetchRequest,
    signal: Option<&AbortSignal>,
) -> Result<Listing, FetchError> {
    dom::window().ok_or(FetchError::NoWindow)?;

    let built = match request {
        FetchRequest::Get { url } => Request::get(url).abort_signal(signal).build(),
        FetchRequest::Batch { url, body } => Request::post(url).abort_signal(signal).json(body),
    }
    .map_err(|_| FetchError::RequestCreationFailed)?;

    let response = built.send().await.map_err(map_error)?;
    read_listing(response).await
}

async fn read_listing(response: Response) -> Result<Listing, FetchError> {
    if !response.ok() {
        return Err(FetchError::HttpError {
            status: response.status(),
            text: response.status_text(),
        });
    }

    response.json::<Listing>().await.map_err(map_error)
}

fn map_error(err: gloo_net::Error) -> FetchError {
    match err {
        gloo_net::Error::JsError(js) if js.name == "AbortError" => FetchError::Aborted,
        gloo_net::Error::JsError(js) => FetchError::NetworkError(js.message),
        gloo_net::Error::SerdeError(e) => FetchError::JsonParseError(e.to_string()),
        gloo_net::Error::GlooError(msg) => FetchError::NetworkError(msg),
    }
}
