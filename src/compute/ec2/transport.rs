use crate::compute::ec2::document::Element;
use crate::compute::Params;
use crate::compute::Transport;
use crate::config::DriverConfig;
use failure::Error;
use failure::ResultExt;
use futures::Future;
use rusoto_core::credential::AwsCredentials;
use rusoto_core::credential::DefaultCredentialsProvider;
use rusoto_core::credential::ProvideAwsCredentials;
use rusoto_core::credential::StaticProvider;
use rusoto_core::param::Params as QueryParams;
use rusoto_core::request::DispatchSignedRequest;
use rusoto_core::request::HttpClient;
use rusoto_core::signature::SignedRequest;
use rusoto_core::Region;
use std::cell::RefCell;
use std::fmt;
use tokio::runtime::current_thread::Runtime;

pub const API_VERSION: &str = "2016-11-15";

/// An error document returned by EC2 with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Fail)]
#[fail(display = "EC2 returned {} ({}): {}", code, status, message)]
pub struct ApiError {
    pub status: u16,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn from_body(status: u16, body: &str) -> ApiError {
        let parsed = Element::parse(body).ok().and_then(|root| {
            let error = root.find("Errors/Error")?;
            Some((
                error.find_text("Code")?.to_owned(),
                error.find_text("Message").unwrap_or("").to_owned(),
            ))
        });
        let (code, message) = parsed.unwrap_or_else(|| ("Unknown".to_owned(), body.trim().to_owned()));
        ApiError {
            status,
            code,
            message,
        }
    }
}

enum Credentials {
    Static(StaticProvider),
    Chain(DefaultCredentialsProvider),
}

/// Signs queries with SigV4 and sends them to the regional EC2 endpoint.
pub struct AwsTransport {
    region: Region,
    dispatcher: HttpClient,
    credentials: Credentials,
    runtime: RefCell<Runtime>,
}

impl AwsTransport {
    pub fn new(config: &DriverConfig) -> Result<AwsTransport, Error> {
        let region = config.rusoto_region()?;
        let dispatcher = HttpClient::new().context("could not create TLS client")?;
        let credentials = match config.credentials {
            Some(ref c) => Credentials::Static(StaticProvider::new_minimal(
                c.access_key.clone(),
                c.secret_key.clone(),
            )),
            None => Credentials::Chain(
                DefaultCredentialsProvider::new()
                    .context("could not create credentials provider")?,
            ),
        };
        let runtime = Runtime::new().context("could not create runtime")?;
        Ok(AwsTransport {
            region,
            dispatcher,
            credentials,
            runtime: RefCell::new(runtime),
        })
    }

    fn credentials(&self) -> Result<AwsCredentials, Error> {
        let mut runtime = self.runtime.borrow_mut();
        let credentials = match self.credentials {
            Credentials::Static(ref p) => runtime.block_on(p.credentials()),
            Credentials::Chain(ref p) => runtime.block_on(p.credentials()),
        };
        Ok(credentials.context("could not load AWS credentials")?)
    }
}

impl fmt::Debug for AwsTransport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ec2 ({})", self.region.name())
    }
}

impl Transport for AwsTransport {
    fn region(&self) -> &str {
        self.region.name()
    }

    fn request(&self, params: &Params) -> Result<String, Error> {
        let mut query = QueryParams::new();
        query.insert("Version".to_owned(), Some(API_VERSION.to_owned()));
        for (key, value) in params {
            query.insert(key.clone(), Some(value.clone()));
        }

        let mut request = SignedRequest::new("GET", "ec2", &self.region, "/");
        request.set_params(query);
        request.sign(&self.credentials()?);

        let response = self
            .runtime
            .borrow_mut()
            .block_on(self.dispatcher.dispatch(request, None).and_then(|r| r.buffer()))?;
        let body = String::from_utf8(response.body.to_vec())?;
        if !response.status.is_success() {
            return Err(ApiError::from_body(response.status.as_u16(), &body).into());
        }
        Ok(body)
    }
}
