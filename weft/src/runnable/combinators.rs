use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::runnable::{BoxRunnable, ChainError, RunValue, Runnable};

/// Steps run in order; each output feeds the next input.
#[derive(Clone)]
pub struct RunnableSequence {
    steps: Vec<BoxRunnable>,
}

impl RunnableSequence {
    pub fn new(steps: Vec<BoxRunnable>) -> Self {
        Self { steps }
    }

    /// Appends a step (flattens instead of nesting).
    pub fn pipe<R: Runnable + 'static>(mut self, next: R) -> Self {
        self.steps.push(Arc::new(next));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for RunnableSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnableSequence")
            .field("steps", &self.steps.len())
            .finish()
    }
}

#[async_trait]
impl Runnable for RunnableSequence {
    async fn invoke(&self, input: RunValue) -> Result<RunValue, ChainError> {
        let mut value = input;
        for (i, step) in self.steps.iter().enumerate() {
            tracing::trace!(step = i, kind = value.kind(), "sequence step");
            value = step.invoke(value).await?;
        }
        Ok(value)
    }
}

/// Runs named branches concurrently on copies of the input; output is a map.
#[derive(Clone, Default)]
pub struct RunnableParallel {
    branches: BTreeMap<String, BoxRunnable>,
}

impl RunnableParallel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch<R: Runnable + 'static>(mut self, name: impl Into<String>, branch: R) -> Self {
        self.branches.insert(name.into(), Arc::new(branch));
        self
    }

    async fn run_branches(&self, input: &RunValue) -> Result<Vec<(String, RunValue)>, ChainError> {
        let runs = self.branches.iter().map(|(name, branch)| {
            let input = input.clone();
            async move { branch.invoke(input).await.map(|v| (name.clone(), v)) }
        });
        futures::future::join_all(runs).await.into_iter().collect()
    }
}

#[async_trait]
impl Runnable for RunnableParallel {
    async fn invoke(&self, input: RunValue) -> Result<RunValue, ChainError> {
        let entries = self.run_branches(&input).await?;
        Ok(RunValue::Map(entries.into_iter().collect()))
    }
}

/// Identity step.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunnablePassthrough;

impl RunnablePassthrough {
    /// Passes a map through with `name` added from `branch` run on the same map.
    pub fn assign<R: Runnable + 'static>(name: impl Into<String>, branch: R) -> RunnableAssign {
        RunnableAssign {
            branches: RunnableParallel::new().with_branch(name, branch),
        }
    }
}

#[async_trait]
impl Runnable for RunnablePassthrough {
    async fn invoke(&self, input: RunValue) -> Result<RunValue, ChainError> {
        Ok(input)
    }
}

/// Map input plus keys computed from it. Computed keys overwrite existing ones.
#[derive(Clone)]
pub struct RunnableAssign {
    branches: RunnableParallel,
}

impl RunnableAssign {
    pub fn assign<R: Runnable + 'static>(mut self, name: impl Into<String>, branch: R) -> Self {
        self.branches = self.branches.with_branch(name, branch);
        self
    }
}

#[async_trait]
impl Runnable for RunnableAssign {
    async fn invoke(&self, input: RunValue) -> Result<RunValue, ChainError> {
        if !matches!(input, RunValue::Map(_)) {
            return Err(ChainError::unexpected("map", &input));
        }
        let entries = self.branches.run_branches(&input).await?;
        let mut map = match input {
            RunValue::Map(map) => map,
            _ => BTreeMap::new(),
        };
        map.extend(entries);
        Ok(RunValue::Map(map))
    }
}

type LambdaFn = Arc<dyn Fn(RunValue) -> Result<RunValue, ChainError> + Send + Sync>;

/// Wraps a plain function.
#[derive(Clone)]
pub struct RunnableLambda {
    func: LambdaFn,
}

impl RunnableLambda {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(RunValue) -> Result<RunValue, ChainError> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }
}

#[async_trait]
impl Runnable for RunnableLambda {
    async fn invoke(&self, input: RunValue) -> Result<RunValue, ChainError> {
        (self.func)(input)
    }
}

/// Selects keys from a map input: one key yields its value, several yield a sub-map.
#[derive(Debug, Clone)]
pub struct RunnablePick {
    keys: Vec<String>,
}

impl RunnablePick {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Runnable for RunnablePick {
    async fn invoke(&self, input: RunValue) -> Result<RunValue, ChainError> {
        let mut map = match input {
            RunValue::Map(map) => map,
            other => return Err(ChainError::unexpected("map", &other)),
        };
        let mut picked = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            let value = map
                .remove(key)
                .ok_or_else(|| ChainError::MissingKey(key.clone()))?;
            picked.push((key.clone(), value));
        }
        if picked.len() == 1 {
            if let Some((_, value)) = picked.pop() {
                return Ok(value);
            }
        }
        Ok(RunValue::Map(picked.into_iter().collect()))
    }
}
