//! # Mock Clients
//!
//! [`MockClient<T>`] hands out a real [`ResourceClient<T>`] whose requests are answered from a
//! queue of scripted expectations instead of an actor. Domain clients and actors that depend
//! on other resources can then be tested without spawning those resources.
//!
//! | | MockClient | Real actor |
//! |---|---|---|
//! | State | Scripted replies | Real store |
//! | Ordering | Strict FIFO of expectations | Mailbox order |
//! | Error injection | `return_err` | Needs a state that fails |
//!
//! ## Scripted replies
//!
//! ```rust
//! use actor_framework::mock::MockClient;
//! use actor_framework::{ActorEntity, FrameworkError};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug, PartialEq)] struct Table { id: u32, seats: u8 }
//! #[derive(Debug)] struct TableCreate;
//! #[derive(Debug)] struct TableUpdate;
//! #[derive(Debug)] enum TableAction {}
//! #[derive(Debug, thiserror::Error)] #[error("table error")] struct TableError;
//!
//! #[async_trait]
//! impl ActorEntity for Table {
//!     type Id = u32; type Create = TableCreate; type Update = TableUpdate;
//!     type Action = TableAction; type ActionResult = (); type Context = (); type Error = TableError;
//!     fn from_create_params(id: u32, _: TableCreate) -> Result<Self, Self::Error> {
//!         Ok(Self { id, seats: 4 })
//!     }
//!     async fn on_update(&mut self, _: TableUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
//!     async fn handle_action(&mut self, _: TableAction, _: &()) -> Result<(), Self::Error> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Table>::new();
//!     mock.expect_get(1).return_ok(Some(Table { id: 1, seats: 2 }));
//!     mock.expect_get(2).return_err(FrameworkError::ActorClosed);
//!
//!     let client = mock.client();
//!     assert_eq!(client.get(1).await.unwrap().unwrap().seats, 2);
//!     assert!(matches!(client.get(2).await, Err(FrameworkError::ActorClosed)));
//!     mock.verify();
//! }
//! ```
//!
//! ## Actor under test, dependencies mocked
//!
//! Pass `mock.client()` (or a domain client wrapping it) into the `Context` of the real actor
//! being tested. The order actor tests in the root crate's `tests/` directory drive a real
//! order actor against a mocked driver actor this way.
//!
//! ## Raw channel
//!
//! [`create_mock_client`] returns the receiving end directly, for tests that need to inspect
//! the payload of a request before replying. See [`expect_action`].

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, oneshot};

enum Expectation<T: ActorEntity> {
    Create(Result<T::Id, FrameworkError>),
    Get(T::Id, Result<Option<T>, FrameworkError>),
    Update(T::Id, Result<T, FrameworkError>),
    Delete(T::Id, Result<(), FrameworkError>),
    Action(T::Id, Result<T::ActionResult, FrameworkError>),
    Find(Result<Vec<T>, FrameworkError>),
}

impl<T: ActorEntity> Expectation<T> {
    fn name(&self) -> &'static str {
        match self {
            Expectation::Create(_) => "create",
            Expectation::Get(..) => "get",
            Expectation::Update(..) => "update",
            Expectation::Delete(..) => "delete",
            Expectation::Action(..) => "action",
            Expectation::Find(_) => "find",
        }
    }
}

fn request_name<T: ActorEntity>(request: &ResourceRequest<T>) -> &'static str {
    match request {
        ResourceRequest::Create { .. } => "create",
        ResourceRequest::Get { .. } => "get",
        ResourceRequest::Update { .. } => "update",
        ResourceRequest::Delete { .. } => "delete",
        ResourceRequest::Action { .. } => "action",
        ResourceRequest::Find { .. } => "find",
    }
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

fn lock<T: ActorEntity>(queue: &Queue<T>) -> MutexGuard<'_, VecDeque<Expectation<T>>> {
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A client backed by a FIFO of expected requests.
///
/// Each incoming request pops the next expectation. A request of the wrong kind, or for a
/// different id than scripted, panics the mock task; the caller then sees
/// [`FrameworkError::ActorDropped`].
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Queue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = lock(&queue).pop_front();
                Self::answer(request, expectation);
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    fn answer(request: ResourceRequest<T>, expectation: Option<Expectation<T>>) {
        match (request, expectation) {
            (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create(response))) => {
                let _ = respond_to.send(response);
            }
            (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get(want, response))) => {
                assert_eq!(id, want, "get for unexpected id");
                let _ = respond_to.send(response);
            }
            (
                ResourceRequest::Update { id, respond_to, .. },
                Some(Expectation::Update(want, response)),
            ) => {
                assert_eq!(id, want, "update for unexpected id");
                let _ = respond_to.send(response);
            }
            (ResourceRequest::Delete { id, respond_to }, Some(Expectation::Delete(want, response))) => {
                assert_eq!(id, want, "delete for unexpected id");
                let _ = respond_to.send(response);
            }
            (
                ResourceRequest::Action { id, respond_to, .. },
                Some(Expectation::Action(want, response)),
            ) => {
                assert_eq!(id, want, "action for unexpected id");
                let _ = respond_to.send(response);
            }
            (ResourceRequest::Find { respond_to, .. }, Some(Expectation::Find(response))) => {
                let _ = respond_to.send(response);
            }
            (request, Some(expectation)) => panic!(
                "expected a {} request, got {}",
                expectation.name(),
                request_name(&request)
            ),
            (request, None) => panic!("unexpected {} request", request_name(&request)),
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        self.builder(|_, response| Expectation::Create(response), None)
    }

    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(|id, response| Expectation::Get(id, response), Some(id))
    }

    pub fn expect_update(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(|id, response| Expectation::Update(id, response), Some(id))
    }

    pub fn expect_delete(&mut self, id: T::Id) -> ExpectationBuilder<T, ()> {
        self.builder(|id, response| Expectation::Delete(id, response), Some(id))
    }

    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        self.builder(|id, response| Expectation::Action(id, response), Some(id))
    }

    pub fn expect_find(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        self.builder(|_, response| Expectation::Find(response), None)
    }

    fn builder<R>(
        &self,
        make: fn(T::Id, Result<R, FrameworkError>) -> Expectation<T>,
        id: Option<T::Id>,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            id: id.unwrap_or_else(|| T::Id::from(0)),
            make,
            expectations: self.expectations.clone(),
        }
    }

    /// Panics if any scripted expectation was not consumed.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

/// Queues the reply for one expected request.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    id: T::Id,
    make: fn(T::Id, Result<R, FrameworkError>) -> Expectation<T>,
    expectations: Queue<T>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    pub fn return_ok(self, value: R) {
        let expectation = (self.make)(self.id, Ok(value));
        lock(&self.expectations).push_back(expectation);
    }

    pub fn return_err(self, error: FrameworkError) {
        let expectation = (self.make)(self.id, Err(error));
        lock(&self.expectations).push_back(expectation);
    }
}

/// Creates a client and the receiving end of its mailbox.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Next request, if it is a Create.
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Create, oneshot::Sender<Result<T::Id, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Next request, if it is a Get.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Next request, if it is an Action.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    oneshot::Sender<Result<T::ActionResult, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Filter;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Barista {
        id: u32,
        name: String,
        on_shift: bool,
    }

    #[derive(Debug)]
    struct BaristaCreate {
        name: String,
    }

    #[derive(Debug)]
    struct BaristaUpdate;

    #[derive(Debug)]
    enum BaristaAction {
        ClockIn,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("barista error")]
    struct BaristaError;

    #[async_trait]
    impl ActorEntity for Barista {
        type Id = u32;
        type Create = BaristaCreate;
        type Update = BaristaUpdate;
        type Action = BaristaAction;
        type ActionResult = bool;
        type Context = ();
        type Error = BaristaError;

        fn from_create_params(id: u32, params: BaristaCreate) -> Result<Self, Self::Error> {
            Ok(Self {
                id,
                name: params.name,
                on_shift: false,
            })
        }

        async fn on_update(&mut self, _: BaristaUpdate, _: &()) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn handle_action(&mut self, _: BaristaAction, _: &()) -> Result<bool, Self::Error> {
            self.on_shift = true;
            Ok(true)
        }
    }

    fn barista(id: u32, name: &str) -> Barista {
        Barista {
            id,
            name: name.to_string(),
            on_shift: false,
        }
    }

    #[tokio::test]
    async fn raw_channel_exposes_create_payload() {
        let (client, mut receiver) = create_mock_client::<Barista>(10);

        let create_task = tokio::spawn(async move {
            client
                .create(BaristaCreate {
                    name: "Noor".to_string(),
                })
                .await
        });

        let (payload, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(payload.name, "Noor");
        responder.send(Ok(7)).unwrap();

        assert_eq!(create_task.await.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn raw_channel_exposes_get_and_action_requests() {
        let (client, mut receiver) = create_mock_client::<Barista>(10);

        let caller = tokio::spawn(async move {
            let before = client.get(3).await?;
            let clocked_in = client.perform_action(3, BaristaAction::ClockIn).await?;
            Ok::<_, FrameworkError>((before, clocked_in))
        });

        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, 3);
        responder.send(Ok(Some(barista(3, "Oda")))).unwrap();

        let (id, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(id, 3);
        assert!(matches!(action, BaristaAction::ClockIn));
        responder.send(Ok(true)).unwrap();

        let (before, clocked_in) = caller.await.unwrap().unwrap();
        assert_eq!(before.unwrap().name, "Oda");
        assert!(clocked_in);
    }

    #[tokio::test]
    async fn scripted_replies_are_served_in_order() {
        let mut mock = MockClient::<Barista>::new();
        mock.expect_create().return_ok(1);
        mock.expect_action(1).return_ok(true);
        mock.expect_update(1).return_ok(barista(1, "Ines"));
        mock.expect_find()
            .return_ok(vec![barista(1, "Ines"), barista(2, "Kai")]);
        mock.expect_delete(1).return_ok(());

        let client = mock.client();
        let id = client
            .create(BaristaCreate {
                name: "Ines".to_string(),
            })
            .await
            .unwrap();
        assert!(client.perform_action(id, BaristaAction::ClockIn).await.unwrap());
        assert_eq!(client.update(id, BaristaUpdate).await.unwrap().name, "Ines");
        assert_eq!(client.find(Filter::all()).await.unwrap().len(), 2);
        client.delete(id).await.unwrap();

        mock.verify();
    }

    #[tokio::test]
    async fn mismatched_request_drops_the_reply() {
        let mut mock = MockClient::<Barista>::new();
        mock.expect_get(1).return_ok(None);

        let result = mock.client().delete(1).await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));
    }

    #[tokio::test]
    #[should_panic(expected = "1 remaining")]
    async fn verify_reports_unused_expectations() {
        let mut mock = MockClient::<Barista>::new();
        mock.expect_get(3).return_ok(None);
        mock.verify();
    }
}
