/// Built-in block registration table
///
/// Every block the builder ships with is listed here explicitly. Adding a
/// block means adding an entry to `definitions()`.

use crate::blocks::{
    decorators::{ConditionalBranches, SwitchCases},
    mapper::{FieldProjection, FieldSpec, SwapConfigMapper},
    types::BlockDefinition,
};
use crate::workflow::types::{START_NODE_TYPE, WALLET_NODE_TYPE};
use serde_json::json;

/// Category id → palette label, in palette order
pub const CATEGORY_LABELS: &[(&str, &str)] = &[
    ("triggers", "Triggers"),
    ("wallet", "Wallet"),
    ("logic", "Logic & Flow"),
    ("notifications", "Notifications"),
    ("defi", "DeFi"),
    ("oracles", "Oracles"),
];

const EVM_CHAINS: &[&str] = &["ETHEREUM", "ARBITRUM", "BASE", "OPTIMISM", "POLYGON"];

/// All blocks the builder ships with
pub fn definitions() -> Vec<BlockDefinition> {
    vec![
        BlockDefinition::new("start", "Start", "play", "triggers", START_NODE_TYPE)
            .with_default_data(json!({ "label": "Start", "triggerType": "MANUAL" }))
            .with_mapper(FieldProjection::new(vec![
                FieldSpec::defaulted("triggerType", json!("MANUAL")),
                FieldSpec::required("schedule"),
            ]))
            .hidden(),
        BlockDefinition::new("wallet", "Wallet", "wallet", "wallet", WALLET_NODE_TYPE)
            .with_backend_type("WALLET")
            .with_default_data(json!({ "walletAddress": null, "safeAddress": null }))
            .with_mapper(
                FieldProjection::of(&["walletAddress", "safeAddress", "chain"])
                    .with_transient(&["balances"]),
            )
            .requires_auth()
            .requires_forced_provider(),
        BlockDefinition::new("if", "If / Else", "git-branch", "logic", "if")
            .with_default_data(json!({ "leftPath": "", "operator": "equals", "rightValue": "" }))
            .with_mapper(FieldProjection::of(&["leftPath", "operator", "rightValue"]))
            .with_edge_decorator(ConditionalBranches),
        BlockDefinition::new("switch", "Switch", "split", "logic", "switch")
            .with_default_data(json!({
                "valuePath": "",
                "cases": [
                    { "id": "case-default", "label": "Default", "isDefault": true }
                ]
            }))
            .with_mapper(FieldProjection::of(&["valuePath", "cases"]))
            .with_edge_decorator(SwitchCases),
        BlockDefinition::new("wait", "Wait", "clock", "logic", "wait")
            .with_backend_type("DELAY")
            .with_default_data(json!({ "durationSeconds": 60 }))
            .with_mapper(FieldProjection::new(vec![FieldSpec::defaulted(
                "durationSeconds",
                json!(60),
            )])),
        BlockDefinition::new("mail", "Email", "mail", "notifications", "mail")
            .with_backend_type("EMAIL")
            .with_default_data(json!({ "to": "", "subject": "", "body": "" }))
            .with_mapper(FieldProjection::of(&["to", "subject", "body"])),
        BlockDefinition::new("slack", "Slack", "slack", "notifications", "slack")
            .with_default_data(json!({ "connectionId": null, "channelId": null, "message": "" }))
            .with_mapper(
                FieldProjection::of(&["connectionId", "channelId", "message"])
                    .with_transient(&["channels", "connectionName"]),
            )
            .requires_auth(),
        BlockDefinition::new("telegram", "Telegram", "send", "notifications", "telegram")
            .with_default_data(json!({ "connectionId": null, "chatId": null, "message": "" }))
            .with_mapper(FieldProjection::of(&["connectionId", "chatId", "message"]))
            .requires_auth(),
        BlockDefinition::new("swap", "Swap", "repeat", "defi", "swap")
            .with_default_data(json!({
                "swapProvider": null,
                "swapChain": null,
                "amount": "",
                "simulateFirst": true
            }))
            .with_supported_chains(EVM_CHAINS)
            .with_mapper(SwapConfigMapper)
            .requires_auth(),
        BlockDefinition::new("lending", "Lending", "landmark", "defi", "lending")
            .with_default_data(json!({
                "lendingProvider": null,
                "lendingChain": null,
                "operation": "SUPPLY",
                "amount": ""
            }))
            .with_supported_chains(EVM_CHAINS)
            .with_mapper(FieldProjection::new(vec![
                FieldSpec::required("lendingProvider"),
                FieldSpec::required("lendingChain"),
                FieldSpec::defaulted("operation", json!("SUPPLY")),
                FieldSpec::required("asset"),
                FieldSpec::required("amount"),
                FieldSpec::required("walletAddress"),
            ]))
            .requires_auth(),
        BlockDefinition::new(
            "chainlink-price",
            "Chainlink Price",
            "activity",
            "oracles",
            "chainlink",
        )
        .with_backend_type("CHAINLINK_PRICE_ORACLE")
        .with_default_data(json!({ "oracleChain": null, "aggregatorAddress": null }))
        .with_supported_chains(EVM_CHAINS)
        .with_mapper(FieldProjection::new(vec![
            FieldSpec::required("oracleChain"),
            FieldSpec::required("aggregatorAddress"),
            FieldSpec::defaulted("staleAfterSeconds", json!(3600)),
        ])),
        BlockDefinition::new("pyth-price", "Pyth Price", "activity", "oracles", "pyth")
            .with_backend_type("PYTH_PRICE_ORACLE")
            .with_default_data(json!({ "oracleChain": null, "priceFeedId": null }))
            .with_mapper(FieldProjection::new(vec![
                FieldSpec::required("oracleChain"),
                FieldSpec::required("priceFeedId"),
                FieldSpec::defaulted("staleAfterSeconds", json!(60)),
            ])),
    ]
}
