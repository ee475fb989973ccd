//! Scripted [`HttpTransport`] for client tests.

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::sync::{Arc, Mutex};

use super::{Client, HttpResponse, HttpTransport, PollConfig, TransportResult};
use crate::domain::{ApiKey, ClientId};
use crate::transport::HttpMethod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
}

#[derive(Debug, Clone)]
enum Reply {
    Respond { status: u16, body: String },
    Fail(String),
}

#[derive(Debug, Default)]
struct FakeTransportState {
    requests: Vec<RecordedRequest>,
    replies: VecDeque<Reply>,
}

#[derive(Debug, Clone)]
/// Replays queued replies in order; the last one repeats once the queue drains.
pub(crate) struct FakeTransport {
    state: Arc<Mutex<FakeTransportState>>,
}

impl FakeTransport {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self::sequence([(status, body.into())])
    }

    pub fn sequence<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = (u16, S)>,
        S: Into<String>,
    {
        let replies = replies
            .into_iter()
            .map(|(status, body)| Reply::Respond {
                status,
                body: body.into(),
            })
            .collect();
        Self::with_replies(replies)
    }

    pub fn failing(message: &str) -> Self {
        Self::with_replies(VecDeque::from([Reply::Fail(message.to_owned())]))
    }

    fn with_replies(replies: VecDeque<Reply>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeTransportState {
                requests: Vec::new(),
                replies,
            })),
        }
    }

    pub fn client(&self) -> Client {
        Client {
            api_key: ApiKey::new("test-key").unwrap(),
            client_id: ClientId::new(42),
            base_url: "https://example.invalid/1.0".to_owned(),
            http: Arc::new(self.clone()),
            poll: PollConfig::default(),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request was sent")
    }

    fn reply<'a>(&'a self, request: RecordedRequest) -> TransportResult<'a> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request);
            let reply = if state.replies.len() > 1 {
                state.replies.pop_front()
            } else {
                state.replies.front().cloned()
            };
            reply.expect("no scripted reply")
        };
        Box::pin(async move {
            match reply {
                Reply::Respond { status, body } => Ok(HttpResponse { status, body }),
                Reply::Fail(message) => Err(Box::<dyn StdError + Send + Sync>::from(message)),
            }
        })
    }
}

impl HttpTransport for FakeTransport {
    fn get<'a>(&'a self, url: &'a str) -> TransportResult<'a> {
        self.reply(RecordedRequest {
            method: HttpMethod::Get,
            url: url.to_owned(),
            body: None,
        })
    }

    fn post_form<'a>(&'a self, url: &'a str, body: String) -> TransportResult<'a> {
        self.reply(RecordedRequest {
            method: HttpMethod::Post,
            url: url.to_owned(),
            body: Some(body),
        })
    }
}
