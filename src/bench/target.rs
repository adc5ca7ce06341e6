//! Benchmark targets: a callable bound to fixed arguments

use std::convert::Infallible;
use std::hint::black_box;

use crate::error::{BenchError, Result};

/// Anything the measurement loop can invoke repeatedly
pub trait Benchmarkable {
    fn name(&self) -> &str;

    /// Run the callable once. The return value is consumed via `black_box`.
    fn invoke(&mut self) -> Result<()>;
}

/// A named callable paired with the arguments it is always called with
pub struct BenchTarget<A, F> {
    name: String,
    args: A,
    func: F,
}

impl<A, F> BenchTarget<A, F> {
    pub fn new<R, E>(name: impl Into<String>, args: A, func: F) -> Self
    where
        F: FnMut(&A) -> std::result::Result<R, E>,
        E: Into<anyhow::Error>,
    {
        Self {
            name: name.into(),
            args,
            func,
        }
    }

    pub fn args(&self) -> &A {
        &self.args
    }
}

impl<A> BenchTarget<A, ()> {
    /// Target for a callable that cannot fail
    pub fn infallible<R, G>(
        name: impl Into<String>,
        args: A,
        mut func: G,
    ) -> BenchTarget<A, impl FnMut(&A) -> std::result::Result<R, Infallible>>
    where
        G: FnMut(&A) -> R,
    {
        BenchTarget {
            name: name.into(),
            args,
            func: move |a: &A| Ok::<R, Infallible>(func(a)),
        }
    }
}

impl<A, F, R, E> Benchmarkable for BenchTarget<A, F>
where
    F: FnMut(&A) -> std::result::Result<R, E>,
    E: Into<anyhow::Error>,
{
    fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    fn invoke(&mut self) -> Result<()> {
        match (self.func)(black_box(&self.args)) {
            Ok(out) => {
                black_box(out);
                Ok(())
            }
            Err(e) => Err(BenchError::invocation(self.name.clone(), e.into())),
        }
    }
}

impl<T: Benchmarkable + ?Sized> Benchmarkable for &mut T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn invoke(&mut self) -> Result<()> {
        (**self).invoke()
    }
}

impl<T: Benchmarkable + ?Sized> Benchmarkable for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn invoke(&mut self) -> Result<()> {
        (**self).invoke()
    }
}
