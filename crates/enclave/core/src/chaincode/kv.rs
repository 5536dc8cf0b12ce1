//! Plain key-value chaincode: `put(k, v)`, `get(k)` and `del(k)`.

use crate::chaincode::{expect_args, Chaincode, ChaincodeError, StateAccess};

#[derive(Clone, Copy, Debug, Default)]
pub struct KvChaincode;

impl Chaincode for KvChaincode {
    fn init(&self, _stub: &mut dyn StateAccess) -> Result<Vec<u8>, ChaincodeError> {
        Ok(vec![])
    }

    fn invoke(&self, stub: &mut dyn StateAccess) -> Result<Vec<u8>, ChaincodeError> {
        let (function, args) = stub.function_and_parameters();
        match function.as_str() {
            "put" => {
                expect_args(&args, 2)?;
                stub.put_state(&args[0], args[1].as_bytes())?;
                Ok(b"OK".to_vec())
            }
            "get" => {
                expect_args(&args, 1)?;
                stub.get_state(&args[0])
            }
            "del" => {
                expect_args(&args, 1)?;
                stub.del_state(&args[0])?;
                Ok(b"OK".to_vec())
            }
            _ => Err(ChaincodeError::UnknownFunction(function)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chaincode::testing::MemoryState;

    #[test]
    fn test_put_get_del() {
        let mut state = MemoryState::call("put", &["k", "v"]);
        assert_eq!(KvChaincode.invoke(&mut state).unwrap(), b"OK");

        state.set_call("get", &["k"]);
        assert_eq!(KvChaincode.invoke(&mut state).unwrap(), b"v");

        state.set_call("del", &["k"]);
        KvChaincode.invoke(&mut state).unwrap();
        state.set_call("get", &["k"]);
        assert!(KvChaincode.invoke(&mut state).unwrap().is_empty());
    }
}
