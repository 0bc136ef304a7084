/*!
   Query the sync status of a full node.
*/

use eyre::eyre;
use serde_json::Value;

use crate::chain::exec::simple_exec;
use crate::error::{handle_generic_error, Error};

/**
   Query the latest block height of the node listening on `rpc_listen_address`.
*/
pub fn query_latest_height(
    chain_id: &str,
    command_path: &str,
    rpc_listen_address: &str,
) -> Result<u64, Error> {
    let output = simple_exec(
        chain_id,
        command_path,
        &["status", "--node", rpc_listen_address],
    )?;

    parse_latest_height(output.json_output())
}

/**
   Extract the latest block height from the JSON printed by `status`.
   The sync info key is `SyncInfo` up to Cosmos SDK v0.47 and `sync_info`
   after that, and the height is encoded as a string.
*/
pub fn parse_latest_height(status: &str) -> Result<u64, Error> {
    let json: Value = serde_json::from_str(status).map_err(handle_generic_error)?;

    let sync_info = json
        .get("SyncInfo")
        .or_else(|| json.get("sync_info"))
        .ok_or_else(|| eyre!("expected `SyncInfo` field in status output"))?;

    let height = sync_info
        .get("latest_block_height")
        .ok_or_else(|| eyre!("expected `latest_block_height` field in sync info"))?;

    match height {
        Value::String(height) => height.parse::<u64>().map_err(handle_generic_error),
        Value::Number(height) => height
            .as_u64()
            .ok_or_else(|| Error::generic(eyre!("latest block height {height} is not a u64"))),
        _ => Err(Error::generic(eyre!(
            "unexpected latest block height value: {height}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_legacy_status() {
        let status = r#"{"NodeInfo":{"network":"ibc-0"},"SyncInfo":{"latest_block_hash":"AB12","latest_block_height":"101","catching_up":false}}"#;

        assert_eq!(parse_latest_height(status).unwrap(), 101);
    }

    #[test]
    fn parse_status_with_snake_case_keys() {
        let status = r#"{"node_info":{"network":"ibc-0"},"sync_info":{"latest_block_height":"42"}}"#;

        assert_eq!(parse_latest_height(status).unwrap(), 42);
    }

    #[test]
    fn reject_status_without_height() {
        assert!(parse_latest_height(r#"{"SyncInfo":{}}"#).is_err());
        assert!(parse_latest_height("not json").is_err());
        assert!(parse_latest_height(r#"{"SyncInfo":{"latest_block_height":"-1"}}"#).is_err());
    }
}
