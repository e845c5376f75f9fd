// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-process orchestration engine
//!
//! `LocalEngine` keeps a ledger of every declaration and resolves the
//! resource graph lazily: a resource is created by its [`Provider`] the first
//! time anything awaits its state, after its inputs and explicit
//! dependencies resolved. Independent resources may therefore be created in
//! any order.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Engine, Properties, Provider, ResourceDeclaration, ResourceHandle, ResourceKind};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::output::{all, Output};

/// One entry of the declaration ledger
#[derive(Debug, Clone, Serialize)]
pub struct DeclarationRecord {
    pub urn: String,
    pub kind: ResourceKind,
    pub name: String,
    /// URNs of explicit dependencies
    pub depends_on: Vec<String>,
    pub declared_at: DateTime<Utc>,
}

/// A declared resource together with its resolved provider state
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedResource {
    #[serde(flatten)]
    pub record: DeclarationRecord,
    pub state: Value,
}

/// Result of converging every declaration of a stack
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub stack: String,
    pub provider: String,
    pub resources: Vec<ResolvedResource>,
    pub exports: BTreeMap<String, String>,
}

#[derive(Default)]
struct Ledger {
    declarations: Vec<(DeclarationRecord, ResourceHandle)>,
    exports: BTreeMap<String, Output<String>>,
}

/// Engine that drives a [`Provider`] from the current process
pub struct LocalEngine<P: Provider> {
    stack: String,
    provider: Arc<P>,
    ledger: Mutex<Ledger>,
}

impl<P: Provider> LocalEngine<P> {
    pub fn new(stack: impl Into<String>, provider: P) -> Self {
        Self {
            stack: stack.into(),
            provider: Arc::new(provider),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn urn(&self, kind: ResourceKind, name: &str) -> String {
        format!("urn:cim:{}::{}::{}", self.stack, kind.token(), name)
    }

    /// Declarations in the order they were registered
    pub fn declarations(&self) -> Vec<DeclarationRecord> {
        self.ledger
            .lock()
            .declarations
            .iter()
            .map(|(record, _)| record.clone())
            .collect()
    }

    /// Names of declared resources of one kind, in declaration order
    pub fn names_of(&self, kind: ResourceKind) -> Vec<String> {
        self.ledger
            .lock()
            .declarations
            .iter()
            .filter(|(record, _)| record.kind == kind)
            .map(|(record, _)| record.name.clone())
            .collect()
    }

    /// Handle of a declared resource
    pub fn handle(&self, kind: ResourceKind, name: &str) -> Option<ResourceHandle> {
        self.ledger
            .lock()
            .declarations
            .iter()
            .find(|(record, _)| record.kind == kind && record.name == name)
            .map(|(_, handle)| handle.clone())
    }

    /// A stack export, if one was published under this name
    pub fn export_value(&self, name: &str) -> Option<Output<String>> {
        self.ledger.lock().exports.get(name).cloned()
    }

    /// Resolve every declaration and export
    ///
    /// Fails with the first resource whose creation fails; resources created
    /// before that stay created.
    pub async fn converge(&self) -> InfrastructureResult<Plan> {
        let (declarations, exports) = {
            let ledger = self.ledger.lock();
            (ledger.declarations.clone(), ledger.exports.clone())
        };

        let mut resources = Vec::with_capacity(declarations.len());
        for (record, handle) in declarations {
            let state = handle.state().resolve().await?;
            debug!("Resolved {}", record.urn);
            resources.push(ResolvedResource { record, state });
        }

        let mut resolved_exports = BTreeMap::new();
        for (name, value) in exports {
            resolved_exports.insert(name, value.resolve().await?);
        }

        Ok(Plan {
            stack: self.stack.clone(),
            provider: self.provider.name().to_string(),
            resources,
            exports: resolved_exports,
        })
    }
}

impl<P: Provider> Engine for LocalEngine<P> {
    fn register(&self, declaration: ResourceDeclaration) -> InfrastructureResult<ResourceHandle> {
        let ResourceDeclaration {
            kind,
            name,
            properties,
            depends_on,
        } = declaration;
        let urn = self.urn(kind, &name);

        let mut ledger = self.ledger.lock();
        if ledger.declarations.iter().any(|(record, _)| record.urn == urn) {
            return Err(InfrastructureError::upstream(
                format!("register {urn}"),
                "duplicate resource URN",
            ));
        }

        let inputs = properties.resolve();
        let dependencies = all(depends_on.iter().map(|handle| handle.state().clone()));
        let provider = self.provider.clone();
        let resource_name = name.clone();
        let resource_urn = urn.clone();

        let state = Output::from_future(async move {
            dependencies.resolve().await?;
            let inputs = inputs.resolve().await?;

            debug!("Creating {}", resource_urn);
            provider
                .create(kind, &resource_name, inputs)
                .await
                .map_err(|e| {
                    warn!("Provider failed to create {}: {}", resource_urn, e);
                    e
                })
        });

        let record = DeclarationRecord {
            urn: urn.clone(),
            kind,
            name: name.clone(),
            depends_on: depends_on.iter().map(|h| h.urn().to_string()).collect(),
            declared_at: Utc::now(),
        };
        let handle = ResourceHandle::new(kind, name, urn, state);

        debug!("Declared {}", record.urn);
        ledger.declarations.push((record, handle.clone()));

        Ok(handle)
    }

    fn invoke(&self, token: &str, args: Properties) -> Output<Value> {
        let provider = self.provider.clone();
        let token = token.to_string();
        let args = args.resolve();

        Output::from_future(async move {
            let args = args.resolve().await?;
            debug!("Invoking {}", token);
            provider.invoke(&token, args).await
        })
    }

    fn export(&self, name: &str, value: Output<String>) {
        debug!("Exporting {}", name);
        self.ledger.lock().exports.insert(name.to_string(), value);
    }
}
