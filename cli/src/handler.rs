//! Type-erased command handlers.
//!
//! Handlers receive the application state mutably plus their validated
//! arguments. Async handlers return a [`HandlerFuture`] borrowing the state;
//! the dispatcher drives it to completion before reporting.

use std::any::Any;
use std::future::Future;
use std::pin::Pin;

use anyhow::anyhow;

use crate::outcome::{IntoOutcome, Outcome};

/// Future returned by async handlers.
pub type HandlerFuture<'a, O> = Pin<Box<dyn Future<Output = O> + 'a>>;

type SyncFn<S> = Box<dyn Fn(&mut S, Box<dyn Any>) -> Outcome>;
type AsyncFn<S> = Box<dyn for<'a> Fn(&'a mut S, Box<dyn Any>) -> HandlerFuture<'a, Outcome>>;

pub(crate) enum Handler<S> {
    Sync(SyncFn<S>),
    Async(AsyncFn<S>),
}

impl<S> std::fmt::Debug for Handler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Handler::Sync"),
            Self::Async(_) => f.write_str("Handler::Async"),
        }
    }
}

fn mismatch() -> Outcome {
    Outcome::Error(anyhow!("validated arguments do not match the handler's argument type"))
}

pub(crate) fn sync_handler<S, T, O, F>(handler: F) -> Handler<S>
where
    S: 'static,
    T: 'static,
    O: IntoOutcome,
    F: Fn(&mut S, T) -> O + 'static,
{
    Handler::Sync(Box::new(move |state: &mut S, args: Box<dyn Any>| -> Outcome {
        match args.downcast::<T>() {
            Ok(args) => handler(state, *args).into_outcome(),
            Err(_) => mismatch(),
        }
    }))
}

fn erase_async<S, F>(f: F) -> AsyncFn<S>
where
    F: for<'a> Fn(&'a mut S, Box<dyn Any>) -> HandlerFuture<'a, Outcome> + 'static,
{
    Box::new(f)
}

pub(crate) fn async_handler<S, T, O, F>(handler: F) -> Handler<S>
where
    S: 'static,
    T: 'static,
    O: IntoOutcome + 'static,
    F: for<'a> Fn(&'a mut S, T) -> HandlerFuture<'a, O> + 'static,
{
    Handler::Async(erase_async(move |state, args| match args.downcast::<T>() {
        Ok(args) => {
            let fut = handler(state, *args);
            Box::pin(async move { fut.await.into_outcome() })
        }
        Err(_) => Box::pin(async { mismatch() }),
    }))
}
