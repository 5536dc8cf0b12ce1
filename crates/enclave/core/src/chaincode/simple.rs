//! Asset transfer between two named accounts holding integer balances.

use log::debug;

use crate::chaincode::{expect_args, Chaincode, ChaincodeError, StateAccess};

#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleChaincode;

impl SimpleChaincode {
    fn balance(stub: &mut dyn StateAccess, account: &str) -> Result<i64, ChaincodeError> {
        let value = stub.get_state(account)?;
        if value.is_empty() {
            return Err(ChaincodeError::Failed(format!("entity not found: {account}")));
        }
        parse_amount(&String::from_utf8_lossy(&value))
    }

    fn transfer(stub: &mut dyn StateAccess, args: &[String]) -> Result<Vec<u8>, ChaincodeError> {
        expect_args(args, 3)?;
        let (a, b) = (&args[0], &args[1]);

        let a_val = Self::balance(stub, a)?;
        let b_val = Self::balance(stub, b)?;
        let x = parse_amount(&args[2])?;

        let a_val = a_val
            .checked_sub(x)
            .ok_or_else(|| ChaincodeError::InvalidArgument("amount overflow".to_string()))?;
        let b_val = b_val
            .checked_add(x)
            .ok_or_else(|| ChaincodeError::InvalidArgument("amount overflow".to_string()))?;
        debug!("Transferring between accounts");

        stub.put_state(a, a_val.to_string().as_bytes())?;
        stub.put_state(b, b_val.to_string().as_bytes())?;
        Ok(vec![])
    }

    fn delete(stub: &mut dyn StateAccess, args: &[String]) -> Result<Vec<u8>, ChaincodeError> {
        expect_args(args, 1)?;
        stub.del_state(&args[0])?;
        Ok(vec![])
    }

    fn query(stub: &mut dyn StateAccess, args: &[String]) -> Result<Vec<u8>, ChaincodeError> {
        expect_args(args, 1)?;
        let value = stub.get_state(&args[0])?;
        if value.is_empty() {
            return Err(ChaincodeError::Failed(format!("nil amount for {}", args[0])));
        }
        Ok(value)
    }
}

impl Chaincode for SimpleChaincode {
    fn init(&self, stub: &mut dyn StateAccess) -> Result<Vec<u8>, ChaincodeError> {
        let (_, args) = stub.function_and_parameters();
        expect_args(&args, 4)?;

        let a_val = parse_amount(&args[1])?;
        let b_val = parse_amount(&args[3])?;
        stub.put_state(&args[0], a_val.to_string().as_bytes())?;
        stub.put_state(&args[2], b_val.to_string().as_bytes())?;
        Ok(vec![])
    }

    fn invoke(&self, stub: &mut dyn StateAccess) -> Result<Vec<u8>, ChaincodeError> {
        let (function, args) = stub.function_and_parameters();
        match function.as_str() {
            "invoke" => Self::transfer(stub, &args),
            "delete" => Self::delete(stub, &args),
            "query" => Self::query(stub, &args),
            _ => Err(ChaincodeError::UnknownFunction(function)),
        }
    }
}

fn parse_amount(value: &str) -> Result<i64, ChaincodeError> {
    value
        .parse()
        .map_err(|_| ChaincodeError::InvalidArgument(format!("expecting integer value, got `{value}`")))
}
