//! Producers shipped with mrkit.

use crate::producer::{DataRequest, InputRow, ProduceError, Producer, ProducerContext};

const EMAIL: &str = "info:email";
const NAME: &str = "info:name";

/// Emits the domain part of `info:email`. Rows without an email address, or
/// with one lacking `@`, emit nothing.
#[derive(Debug, Default)]
pub struct EmailDomainProducer;

impl Producer for EmailDomainProducer {
    fn name(&self) -> &'static str {
        "email-domain"
    }

    fn data_request(&self) -> DataRequest {
        DataRequest::create("info", "email")
    }

    fn output_column(&self) -> &str {
        "derived:domain"
    }

    fn produce(&self, input: &InputRow, ctx: &mut ProducerContext) -> Result<(), ProduceError> {
        let Some(email) = input.get(EMAIL) else {
            return Ok(());
        };
        match email.split_once('@') {
            Some((_, domain)) => ctx.put(domain),
            None => ctx.increment("EMAIL_WITHOUT_AT", 1),
        }
        Ok(())
    }
}

/// Emits `info:name` in upper case.
#[derive(Debug, Default)]
pub struct UppercaseProducer;

impl Producer for UppercaseProducer {
    fn name(&self) -> &'static str {
        "uppercase"
    }

    fn data_request(&self) -> DataRequest {
        DataRequest::create("info", "name")
    }

    fn output_column(&self) -> &str {
        "derived:name_upper"
    }

    fn produce(&self, input: &InputRow, ctx: &mut ProducerContext) -> Result<(), ProduceError> {
        if let Some(name) = input.get(NAME) {
            ctx.put(name.to_uppercase());
        }
        Ok(())
    }
}

/// Fails on the first row. Used to exercise failed-job recording.
#[derive(Debug, Default)]
pub struct AlwaysFailProducer;

impl Producer for AlwaysFailProducer {
    fn name(&self) -> &'static str {
        "always-fail"
    }

    fn data_request(&self) -> DataRequest {
        DataRequest::create("info", "email")
    }

    fn output_column(&self) -> &str {
        "derived:domain"
    }

    fn produce(&self, _input: &InputRow, _ctx: &mut ProducerContext) -> Result<(), ProduceError> {
        Err(ProduceError::new("this producer always fails"))
    }
}
