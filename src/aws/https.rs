// Copyright (c) 2025 - Cowboy AI, Inc.
//! ACM Certificate with Route53 DNS Validation
//!
//! Requests a DNS-validated certificate for a domain (plus optional subject
//! alternative names) and publishes one validation CNAME per name in the
//! hosted zone:
//!
//! ```text
//! <name>-cert
//!   ├── <name>-url                  (primary domain, validation option 0)
//!   └── <name>-<i>-subject-url      (SAN i, validation option i)
//! ```

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::Component;
use crate::domain::invariants::{require_non_empty, ValidationResult};
use crate::domain::ZoneName;
use crate::engine::{
    invoke, string_field, Engine, Properties, ResourceDeclaration, ResourceHandle, ResourceKind,
};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::output::Output;

/// TTL of the validation records, in seconds
const VALIDATION_RECORD_TTL: u32 = 300;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Https {
    pub name: String,

    /// Hosted zone, fully qualified (`example.com.`)
    pub zone: String,
    pub private_zone: bool,
    pub domain_name: String,
    pub subject_alternative_names: Vec<String>,

    #[serde(skip)]
    pub out: Option<HttpsOut>,
}

#[derive(Debug, Clone)]
pub struct HttpsOut {
    pub cert: ResourceHandle,

    /// Validation record of the primary domain
    pub record: ResourceHandle,

    /// Validation records of the subject alternative names, in order
    pub subject_records: Vec<ResourceHandle>,

    /// Result of the hosted zone lookup
    pub zone: Output<Value>,
}

/// One entry of the certificate's domain validation options
fn validation_option(cert: &ResourceHandle, index: usize) -> Output<Value> {
    let what = format!("{}.domainValidationOptions[{}]", cert.urn(), index);

    cert.output("domainValidationOptions").try_apply(move |options| {
        options
            .get(index)
            .cloned()
            .ok_or_else(|| InfrastructureError::coercion(what, "validation option not present"))
    })
}

fn option_field(option: &Output<Value>, key: &'static str) -> Output<String> {
    option.try_apply(move |option| string_field(&option, key, "domain validation option"))
}

impl Https {
    pub fn new(
        name: impl Into<String>,
        zone: impl Into<String>,
        domain_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            zone: zone.into(),
            domain_name: domain_name.into(),
            ..Default::default()
        }
    }

    /// Declare the validation record of one certificate domain
    fn validation_record(
        &self,
        engine: &dyn Engine,
        record_name: String,
        cert: &ResourceHandle,
        index: usize,
        zone_id: &Output<String>,
    ) -> InfrastructureResult<ResourceHandle> {
        debug!("Declaring validation record {} (option {})", record_name, index);

        let option = validation_option(cert, index);
        let records = option_field(&option, "resourceRecordValue").apply(|value| vec![value]);

        engine.register(
            ResourceDeclaration::new(ResourceKind::Route53Record, record_name).properties(
                Properties::new()
                    .set_output("zoneId", zone_id)
                    .set_output("name", &option_field(&option, "resourceRecordName"))
                    .set_output("type", &option_field(&option, "resourceRecordType"))
                    .set("ttl", VALIDATION_RECORD_TTL)
                    .set_output("records", &records),
            ),
        )
    }
}

impl Component for Https {
    fn component_type(&self) -> &'static str {
        "HTTPS"
    }

    /// Validate the certificate configuration
    ///
    /// # Rules
    /// - Name and zone must be set
    /// - Zone must be fully qualified, i.e. end with a trailing period
    /// - Domain name must be set
    fn validate(&self) -> ValidationResult {
        require_non_empty("HTTPS.Name", &self.name)?;
        require_non_empty("HTTPS.Zone", &self.zone)?;
        ZoneName::new(self.zone.as_str())
            .map_err(|e| InfrastructureError::invalid_format("HTTPS.Zone", &self.zone, e.to_string()))?;
        require_non_empty("HTTPS.DomainName", &self.domain_name)?;
        Ok(())
    }

    fn run(&mut self, engine: &dyn Engine) -> InfrastructureResult<()> {
        self.validate()?;
        info!("Declaring certificate {} for {}", self.name, self.domain_name);

        let mut cert_properties = Properties::new()
            .set("domainName", &self.domain_name)
            .set("tags", json!({}))
            .set("validationMethod", "DNS");
        if !self.subject_alternative_names.is_empty() {
            cert_properties = cert_properties.set("subjectAlternativeNames", &self.subject_alternative_names);
        }

        let cert = engine.register(
            ResourceDeclaration::new(ResourceKind::AcmCertificate, format!("{}-cert", self.name))
                .properties(cert_properties),
        )?;

        let zone = engine.invoke(
            invoke::ROUTE53_GET_ZONE,
            Properties::new()
                .set("name", &self.zone)
                .set("privateZone", self.private_zone),
        );
        let zone_id = zone.try_apply(|zone| string_field(&zone, "zoneId", invoke::ROUTE53_GET_ZONE));

        let record = self.validation_record(engine, format!("{}-url", self.name), &cert, 0, &zone_id)?;

        let mut subject_records = Vec::with_capacity(self.subject_alternative_names.len());
        for index in 1..=self.subject_alternative_names.len() {
            let record_name = format!("{}-{}-subject-url", self.name, index);
            subject_records.push(self.validation_record(engine, record_name, &cert, index, &zone_id)?);
        }

        self.out = Some(HttpsOut {
            cert,
            record,
            subject_records,
            zone,
        });

        Ok(())
    }
}
