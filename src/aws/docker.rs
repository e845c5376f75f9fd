// Copyright (c) 2025 - Cowboy AI, Inc.
//! ECR Repository + Docker Image
//!
//! Declares an encrypted, scan-on-push ECR repository and an image built
//! from a local context and pushed to it. Registry credentials are fetched
//! from ECR once the repository exists.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

use super::Component;
use crate::domain::invariants::{require_non_empty, require_present, ValidationResult};
use crate::engine::{
    invoke, string_field, Engine, Properties, ResourceDeclaration, ResourceHandle, ResourceKind,
};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::output::Output;

/// Image build parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerBuild {
    /// Build context directory
    pub context: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl DockerBuild {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            ..Default::default()
        }
    }
}

/// Credentials the image push authenticates with
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ImageRegistry {
    pub server: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ImageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRegistry")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Split an ECR authorization token into username and password
///
/// The token is base64 of `<username>:<password>`; anything that does not
/// decode to exactly two `:`-separated parts is rejected.
pub fn decode_registry_credentials(token: &str) -> InfrastructureResult<(String, String)> {
    const FIELD: &str = "ECR.AuthorizationToken";

    let decoded = STANDARD
        .decode(token)
        .map_err(|e| InfrastructureError::invalid_format(FIELD, "<redacted>", format!("not base64: {e}")))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| InfrastructureError::invalid_format(FIELD, "<redacted>", "not UTF-8"))?;

    let parts: Vec<&str> = decoded.split(':').collect();
    match parts.as_slice() {
        [username, password] => Ok((username.to_string(), password.to_string())),
        _ => Err(InfrastructureError::invalid_format(
            FIELD,
            "<redacted>",
            format!("invalid credentials: expected 2 parts, got {}", parts.len()),
        )),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Docker {
    pub name: String,
    pub build: Option<DockerBuild>,

    #[serde(skip)]
    pub out: Option<DockerOut>,
}

#[derive(Debug, Clone)]
pub struct DockerOut {
    pub repo: ResourceHandle,
    pub image: ResourceHandle,
}

impl DockerOut {
    /// Fully qualified name of the pushed image
    pub fn image_name(&self) -> Output<String> {
        self.image.string_output("imageName")
    }
}

impl Docker {
    pub fn new(name: impl Into<String>, build: DockerBuild) -> Self {
        Self {
            name: name.into(),
            build: Some(build),
            out: None,
        }
    }
}

/// Fetch and decode push credentials for the repository's registry
fn registry_credentials(engine: &dyn Engine, repo: &ResourceHandle) -> Output<ImageRegistry> {
    let credentials = engine.invoke(
        invoke::ECR_GET_CREDENTIALS,
        Properties::new().set_output("registryId", &repo.string_output("registryId")),
    );

    credentials.try_apply(|credentials| {
        let token = string_field(&credentials, "authorizationToken", invoke::ECR_GET_CREDENTIALS)?;
        let server = string_field(&credentials, "proxyEndpoint", invoke::ECR_GET_CREDENTIALS)?;
        let (username, password) = decode_registry_credentials(&token)?;

        Ok(ImageRegistry {
            server,
            username,
            password,
        })
    })
}

impl Component for Docker {
    fn component_type(&self) -> &'static str {
        "Docker"
    }

    fn validate(&self) -> ValidationResult {
        require_non_empty("Docker.Name", &self.name)?;
        require_present("Docker.Build", self.build.as_ref())?;
        Ok(())
    }

    fn run(&mut self, engine: &dyn Engine) -> InfrastructureResult<()> {
        self.validate()?;
        let build = self
            .build
            .clone()
            .ok_or_else(|| InfrastructureError::missing("Docker.Build"))?;
        info!("Declaring ECR repository and image {}", self.name);

        let repo = engine.register(
            ResourceDeclaration::new(ResourceKind::EcrRepository, &self.name).properties(
                Properties::new()
                    .set("name", &self.name)
                    .set("encryptionConfigurations", json!([{ "encryptionType": "AES256" }]))
                    .set("imageTagMutability", "MUTABLE")
                    .set("imageScanningConfiguration", json!({ "scanOnPush": true })),
            ),
        )?;

        let registry = registry_credentials(engine, &repo);
        debug!("Image {} pushes with credentials of its ECR registry", self.name);

        let image = engine.register(
            ResourceDeclaration::new(ResourceKind::DockerImage, &self.name).properties(
                Properties::new()
                    .set("build", &build)
                    .set_output("imageName", &repo.string_output("repositoryUrl"))
                    .set_output("registry", &registry),
            ),
        )?;

        self.out = Some(DockerOut { repo, image });
        Ok(())
    }
}
