use crate::{
    attestor::Attestor, csp::Csp, error::Error, handler::Handler, ledger::ChaincodeStub,
    shared::SharedEnclave,
};

/// `__invoke`: a serialized `ChaincodeRequestMessage` and the ledger to run it against.
#[derive(Debug)]
pub struct InvokeRequest<S> {
    pub stub: S,
    pub request: Vec<u8>,
}

#[async_trait::async_trait]
impl<S, C, A> Handler<SharedEnclave<C, A>> for InvokeRequest<S>
where
    S: ChaincodeStub + Send,
    C: Csp,
    A: Attestor,
{
    type Error = Error;
    type Response = Vec<u8>;

    async fn handle(self, ctx: &SharedEnclave<C, A>) -> Result<Self::Response, Self::Error> {
        ctx.invoke(self.stub, &self.request).await
    }
}
