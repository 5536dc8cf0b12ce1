pub mod init;
pub mod invoke;

/// A request the enclave can serve within a given context.
#[async_trait::async_trait]
pub trait Handler<Context: Sync>: Send {
    type Error;
    type Response;

    async fn handle(self, ctx: &Context) -> Result<Self::Response, Self::Error>;
}
