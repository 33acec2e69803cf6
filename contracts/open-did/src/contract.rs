use cosmwasm_std::{
    entry_point, to_json_binary, Addr, Binary, Deps, DepsMut, Env, Event, HexBinary,
    MessageInfo, Reply, Response, StdResult, SubMsg, SubMsgResult, WasmMsg,
};
use cw2::set_contract_version;
use did_claims_registry::msg::{NonceResponse, QueryMsg as LedgerQueryMsg};
use opendid_shared::ens::{
    OwnerResponse, RegistryQueryMsg, ResolverExecuteMsg, ResolverQueryMsg, ResolverResponse,
    TextResponse,
};
use opendid_shared::{
    append_digest, eth_signed_message_hash, format_did, namehash, registration_digest, Node,
    TEXT_RECORD_KEY,
};

use crate::error::ContractError;
use crate::msg::{
    ConfigResponse, DidResponse, ExecuteMsg, HasDidResponse, InstantiateMsg, MessageResponse,
    NamehashResponse, QueryMsg,
};
use crate::state::{Config, PendingClaim, CONFIG, PENDING_CLAIMS};

const CONTRACT_NAME: &str = "crates.io:open-did";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const MAX_BATCH_SIZE: usize = 50;
/// Reply ids of batch items are `BATCH_REPLY_ID_BASE + position`
const BATCH_REPLY_ID_BASE: u64 = 1_000;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let config = Config {
        admin: info.sender.clone(),
        ens_registry: deps.api.addr_validate(&msg.ens_registry)?,
        claims_registry: msg
            .claims_registry
            .map(|addr| deps.api.addr_validate(&addr))
            .transpose()?,
    };
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("admin", info.sender)
        .add_attribute("ens_registry", config.ens_registry))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::ClaimDid { name, cid } => execute_claim_did(deps, info, name, cid),
        ExecuteMsg::UpdateDid { name, cid } => execute_update_did(deps, info, name, cid),
        ExecuteMsg::RevokeDid { name } => execute_revoke_did(deps, info, name),
        ExecuteMsg::BatchClaimDid { names, cids } => {
            execute_batch_claim_did(deps, info, names, cids)
        }
        ExecuteMsg::UpdateConfig { claims_registry } => {
            execute_update_config(deps, info, claims_registry)
        }
    }
}

/// A name whose owner has been checked and whose resolver is known
struct AuthorizedName {
    node: Node,
    resolver: Addr,
}

fn query_owner(deps: Deps, registry: &Addr, node: &Node) -> StdResult<Option<Addr>> {
    let res: OwnerResponse = deps.querier.query_wasm_smart(
        registry,
        &RegistryQueryMsg::Owner {
            node: HexBinary::from(&node[..]),
        },
    )?;
    Ok(res.owner)
}

fn query_resolver(deps: Deps, registry: &Addr, node: &Node) -> StdResult<Option<Addr>> {
    let res: ResolverResponse = deps.querier.query_wasm_smart(
        registry,
        &RegistryQueryMsg::Resolver {
            node: HexBinary::from(&node[..]),
        },
    )?;
    Ok(res.resolver)
}

fn query_text(deps: Deps, resolver: &Addr, node: &Node) -> StdResult<String> {
    let res: TextResponse = deps.querier.query_wasm_smart(
        resolver,
        &ResolverQueryMsg::Text {
            node: HexBinary::from(&node[..]),
            key: TEXT_RECORD_KEY.to_string(),
        },
    )?;
    Ok(res.value)
}

fn require_owner(
    deps: Deps,
    config: &Config,
    account: &Addr,
    node: &Node,
) -> Result<(), ContractError> {
    match query_owner(deps, &config.ens_registry, node)? {
        Some(owner) if owner == *account => Ok(()),
        _ => Err(ContractError::NotOwner {}),
    }
}

/// Ownership then resolver check, in that order
fn authorize_name(
    deps: Deps,
    config: &Config,
    sender: &Addr,
    name: &str,
) -> Result<AuthorizedName, ContractError> {
    let node = namehash(name);
    require_owner(deps, config, sender, &node)?;
    let resolver = query_resolver(deps, &config.ens_registry, &node)?
        .ok_or(ContractError::ResolverMissing {})?;
    Ok(AuthorizedName { node, resolver })
}

fn set_text_msg(target: &AuthorizedName, value: &str) -> StdResult<WasmMsg> {
    Ok(WasmMsg::Execute {
        contract_addr: target.resolver.to_string(),
        msg: to_json_binary(&ResolverExecuteMsg::SetText {
            node: HexBinary::from(&target.node[..]),
            key: TEXT_RECORD_KEY.to_string(),
            value: value.to_string(),
        })?,
        funds: vec![],
    })
}

/// All checks of a claim. Returns the target and the DID to write.
fn prepare_claim(
    deps: Deps,
    config: &Config,
    sender: &Addr,
    name: &str,
    cid: &str,
) -> Result<(AuthorizedName, String), ContractError> {
    if name.is_empty() || cid.is_empty() {
        return Err(ContractError::EmptyInput {});
    }
    let target = authorize_name(deps, config, sender, name)?;
    if !query_text(deps, &target.resolver, &target.node)?.is_empty() {
        return Err(ContractError::AlreadyExists {});
    }
    Ok((target, format_did(cid)))
}

pub fn execute_claim_did(
    deps: DepsMut,
    info: MessageInfo,
    name: String,
    cid: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let (target, did) = prepare_claim(deps.as_ref(), &config, &info.sender, &name, &cid)?;

    Ok(Response::new()
        .add_message(set_text_msg(&target, &did)?)
        .add_attribute("method", "claim_did")
        .add_attribute("name", name)
        .add_attribute("node", HexBinary::from(&target.node[..]).to_hex())
        .add_attribute("did", did)
        .add_attribute("owner", info.sender))
}

pub fn execute_update_did(
    deps: DepsMut,
    info: MessageInfo,
    name: String,
    cid: String,
) -> Result<Response, ContractError> {
    if name.is_empty() || cid.is_empty() {
        return Err(ContractError::EmptyInput {});
    }
    let config = CONFIG.load(deps.storage)?;
    let target = authorize_name(deps.as_ref(), &config, &info.sender, &name)?;

    let old_did = query_text(deps.as_ref(), &target.resolver, &target.node)?;
    let new_did = format_did(&cid);

    Ok(Response::new()
        .add_message(set_text_msg(&target, &new_did)?)
        .add_attribute("method", "update_did")
        .add_attribute("name", name)
        .add_attribute("node", HexBinary::from(&target.node[..]).to_hex())
        .add_attribute("old_did", old_did)
        .add_attribute("new_did", new_did))
}

pub fn execute_revoke_did(
    deps: DepsMut,
    info: MessageInfo,
    name: String,
) -> Result<Response, ContractError> {
    if name.is_empty() {
        return Err(ContractError::EmptyInput {});
    }
    let config = CONFIG.load(deps.storage)?;
    let target = authorize_name(deps.as_ref(), &config, &info.sender, &name)?;

    let old_did = query_text(deps.as_ref(), &target.resolver, &target.node)?;

    Ok(Response::new()
        .add_message(set_text_msg(&target, "")?)
        .add_attribute("method", "revoke_did")
        .add_attribute("name", name)
        .add_attribute("node", HexBinary::from(&target.node[..]).to_hex())
        .add_attribute("old_did", old_did))
}

pub fn execute_batch_claim_did(
    deps: DepsMut,
    info: MessageInfo,
    names: Vec<String>,
    cids: Vec<String>,
) -> Result<Response, ContractError> {
    if names.len() != cids.len() {
        return Err(ContractError::LengthMismatch {});
    }
    if names.len() > MAX_BATCH_SIZE {
        return Err(ContractError::BatchTooLarge {
            max: MAX_BATCH_SIZE,
        });
    }
    let config = CONFIG.load(deps.storage)?;

    let mut response = Response::new().add_attribute("method", "batch_claim_did");
    // Records written earlier in this batch are not visible to the resolver
    // query yet, so repeated names are caught here instead.
    let mut accepted: Vec<Node> = Vec::with_capacity(names.len());

    for (name, cid) in names.iter().zip(cids.iter()) {
        let prepared = prepare_claim(deps.as_ref(), &config, &info.sender, name, cid)
            .and_then(|(target, did)| {
                if accepted.contains(&target.node) {
                    return Err(ContractError::AlreadyExists {});
                }
                Ok((target, did))
            });

        let (target, did) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => {
                deps.api
                    .debug(&format!("batch_claim_did: skipping {}: {}", name, err));
                continue;
            }
        };

        // The claim_did event is emitted from `reply` once the write lands
        let reply_id = BATCH_REPLY_ID_BASE + accepted.len() as u64;
        let pending = PendingClaim {
            name: name.clone(),
            node: HexBinary::from(&target.node[..]),
            did: did.clone(),
            owner: info.sender.clone(),
        };
        PENDING_CLAIMS.save(deps.storage, reply_id, &pending)?;
        response = response.add_submessage(SubMsg::reply_always(
            set_text_msg(&target, &did)?,
            reply_id,
        ));
        accepted.push(target.node);
    }

    Ok(response.add_attribute("accepted", accepted.len().to_string()))
}

pub fn execute_update_config(
    deps: DepsMut,
    info: MessageInfo,
    claims_registry: Option<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {});
    }

    config.claims_registry = claims_registry
        .map(|addr| deps.api.addr_validate(&addr))
        .transpose()?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "update_config")
        .add_attribute(
            "claims_registry",
            config
                .claims_registry
                .map(|addr| addr.to_string())
                .unwrap_or_default(),
        ))
}

/// Confirm a batch item. A failed write is dropped so sibling items still
/// commit; only confirmed writes produce a `claim_did` event.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, _env: Env, msg: Reply) -> Result<Response, ContractError> {
    let pending = PENDING_CLAIMS
        .may_load(deps.storage, msg.id)?
        .ok_or(ContractError::UnknownReplyId { id: msg.id })?;
    PENDING_CLAIMS.remove(deps.storage, msg.id);

    match msg.result {
        SubMsgResult::Ok(_) => Ok(Response::new().add_event(
            Event::new("claim_did")
                .add_attribute("name", pending.name)
                .add_attribute("node", pending.node.to_hex())
                .add_attribute("did", pending.did)
                .add_attribute("owner", pending.owner),
        )),
        SubMsgResult::Err(err) => {
            deps.api.debug(&format!(
                "batch_claim_did: resolver write for {} failed: {}",
                pending.name, err
            ));
            Ok(Response::new())
        }
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    let res = match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Namehash { name } => to_json_binary(&NamehashResponse {
            node: HexBinary::from(&namehash(&name)[..]),
        }),
        QueryMsg::GetDid { name } => to_json_binary(&DidResponse {
            did: lookup_did(deps, &name)?,
        }),
        QueryMsg::HasDid { name } => to_json_binary(&HasDidResponse {
            has_did: !lookup_did(deps, &name)?.is_empty(),
        }),
        QueryMsg::RegistrationMessage { name, claimant } => {
            to_json_binary(&query_registration_message(deps, name, claimant)?)
        }
        QueryMsg::AppendMessage {
            name,
            claimant,
            cid,
            claim_type,
        } => to_json_binary(&query_append_message(
            deps, name, claimant, cid, claim_type,
        )?),
    }?;
    Ok(res)
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        admin: config.admin,
        ens_registry: config.ens_registry,
        claims_registry: config.claims_registry,
    })
}

/// Current DID text record; empty when the name, its resolver or the record
/// cannot be found.
fn lookup_did(deps: Deps, name: &str) -> StdResult<String> {
    if name.is_empty() {
        return Ok(String::new());
    }
    let config = CONFIG.load(deps.storage)?;
    let node = namehash(name);
    let resolver = match query_resolver(deps, &config.ens_registry, &node) {
        Ok(Some(resolver)) => resolver,
        _ => return Ok(String::new()),
    };
    Ok(query_text(deps, &resolver, &node).unwrap_or_default())
}

/// Check `claimant` owns `name` and fetch the ledger address and the nonce
/// of `did:opendid:<name>`.
fn message_context(
    deps: Deps,
    name: &str,
    claimant: &str,
) -> Result<(Addr, String, u64), ContractError> {
    if name.is_empty() {
        return Err(ContractError::EmptyInput {});
    }
    let config = CONFIG.load(deps.storage)?;
    let claimant = deps.api.addr_validate(claimant)?;
    require_owner(deps, &config, &claimant, &namehash(name))?;

    let ledger = config
        .claims_registry
        .ok_or(ContractError::LedgerNotConfigured {})?;
    let did = format_did(name);
    let res: NonceResponse = deps
        .querier
        .query_wasm_smart(&ledger, &LedgerQueryMsg::Nonce { did: did.clone() })?;
    Ok((ledger, did, res.nonce))
}

fn message_response(did: String, nonce: u64, digest: [u8; 32]) -> MessageResponse {
    MessageResponse {
        did,
        nonce,
        message_hash: HexBinary::from(&digest[..]),
        eth_signed_message_hash: HexBinary::from(&eth_signed_message_hash(&digest)[..]),
    }
}

fn query_registration_message(
    deps: Deps,
    name: String,
    claimant: String,
) -> Result<MessageResponse, ContractError> {
    let (ledger, did, nonce) = message_context(deps, &name, &claimant)?;
    let digest = registration_digest(&did, ledger.as_str(), nonce);
    Ok(message_response(did, nonce, digest))
}

fn query_append_message(
    deps: Deps,
    name: String,
    claimant: String,
    cid: String,
    claim_type: String,
) -> Result<MessageResponse, ContractError> {
    if cid.is_empty() || claim_type.is_empty() {
        return Err(ContractError::EmptyInput {});
    }
    let (ledger, did, nonce) = message_context(deps, &name, &claimant)?;
    let digest = append_digest(&did, &cid, &claim_type, ledger.as_str(), nonce);
    Ok(message_response(did, nonce, digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::{
        mock_dependencies, mock_env, mock_info, MockApi, MockQuerier, MockStorage,
    };
    use cosmwasm_std::{from_json, OwnedDeps, SubMsgResponse};

    fn setup() -> OwnedDeps<MockStorage, MockApi, MockQuerier> {
        let mut deps = mock_dependencies();
        let msg = InstantiateMsg {
            ens_registry: "ens".to_string(),
            claims_registry: None,
        };
        instantiate(deps.as_mut(), mock_env(), mock_info("creator", &[]), msg).unwrap();
        deps
    }

    #[test]
    fn proper_initialization() {
        let deps = setup();
        let res = query(deps.as_ref(), mock_env(), QueryMsg::Config {}).unwrap();
        let value: ConfigResponse = from_json(&res).unwrap();
        assert_eq!(value.admin.as_str(), "creator");
        assert_eq!(value.ens_registry.as_str(), "ens");
        assert_eq!(value.claims_registry, None);
    }

    #[test]
    fn namehash_query_matches_ens() {
        let deps = setup();
        let res = query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::Namehash { name: "foo.eth".to_string() },
        )
        .unwrap();
        let value: NamehashResponse = from_json(&res).unwrap();
        assert_eq!(
            value.node.to_hex(),
            "de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );

        let res = query(deps.as_ref(), mock_env(), QueryMsg::Namehash { name: String::new() })
            .unwrap();
        let value: NamehashResponse = from_json(&res).unwrap();
        assert_eq!(value.node.as_slice(), &[0u8; 32]);
    }

    #[test]
    fn empty_input_rejected_before_lookups() {
        let mut deps = setup();
        let info = mock_info("alice", &[]);

        let msg = ExecuteMsg::ClaimDid { name: String::new(), cid: "Qm1".to_string() };
        let err = execute(deps.as_mut(), mock_env(), info.clone(), msg).unwrap_err();
        assert!(matches!(err, ContractError::EmptyInput {}));

        let msg = ExecuteMsg::ClaimDid { name: "alice.eth".to_string(), cid: String::new() };
        let err = execute(deps.as_mut(), mock_env(), info.clone(), msg).unwrap_err();
        assert!(matches!(err, ContractError::EmptyInput {}));

        let msg = ExecuteMsg::RevokeDid { name: String::new() };
        let err = execute(deps.as_mut(), mock_env(), info, msg).unwrap_err();
        assert!(matches!(err, ContractError::EmptyInput {}));
    }

    #[test]
    fn empty_name_reads_as_no_did() {
        let deps = setup();
        let res = query(deps.as_ref(), mock_env(), QueryMsg::GetDid { name: String::new() })
            .unwrap();
        let value: DidResponse = from_json(&res).unwrap();
        assert_eq!(value.did, "");

        let res = query(deps.as_ref(), mock_env(), QueryMsg::HasDid { name: String::new() })
            .unwrap();
        let value: HasDidResponse = from_json(&res).unwrap();
        assert!(!value.has_did);
    }

    #[test]
    fn unreachable_registry_reads_as_no_did() {
        // The mock querier has no contract at "ens"
        let deps = setup();
        let res = query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::GetDid { name: "alice.eth".to_string() },
        )
        .unwrap();
        let value: DidResponse = from_json(&res).unwrap();
        assert_eq!(value.did, "");
    }

    #[test]
    fn batch_checks_lengths_first() {
        let mut deps = setup();
        let msg = ExecuteMsg::BatchClaimDid {
            names: vec!["a.eth".to_string(), "b.eth".to_string()],
            cids: vec!["Qm1".to_string()],
        };
        let err = execute(deps.as_mut(), mock_env(), mock_info("alice", &[]), msg).unwrap_err();
        assert!(matches!(err, ContractError::LengthMismatch {}));

        let names: Vec<String> = (0..=MAX_BATCH_SIZE).map(|i| format!("n{}.eth", i)).collect();
        let cids = names.iter().map(|_| "Qm".to_string()).collect();
        let msg = ExecuteMsg::BatchClaimDid { names, cids };
        let err = execute(deps.as_mut(), mock_env(), mock_info("alice", &[]), msg).unwrap_err();
        assert!(matches!(err, ContractError::BatchTooLarge { max: MAX_BATCH_SIZE }));
    }

    #[test]
    fn update_config_admin_only() {
        let mut deps = setup();
        let msg = ExecuteMsg::UpdateConfig { claims_registry: Some("ledger".to_string()) };

        let err = execute(deps.as_mut(), mock_env(), mock_info("mallory", &[]), msg.clone())
            .unwrap_err();
        assert!(matches!(err, ContractError::Unauthorized {}));

        execute(deps.as_mut(), mock_env(), mock_info("creator", &[]), msg).unwrap();
        let res = query(deps.as_ref(), mock_env(), QueryMsg::Config {}).unwrap();
        let value: ConfigResponse = from_json(&res).unwrap();
        assert_eq!(value.claims_registry.unwrap().as_str(), "ledger");
    }

    #[test]
    fn message_queries_reject_empty_name() {
        let deps = setup();
        let err = query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::RegistrationMessage {
                name: String::new(),
                claimant: "alice".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::EmptyInput {}));
    }

    #[test]
    fn unknown_reply_id_rejected() {
        let mut deps = setup();
        let msg = Reply {
            id: 42,
            result: SubMsgResult::Err("boom".to_string()),
        };
        let err = reply(deps.as_mut(), mock_env(), msg).unwrap_err();
        assert!(matches!(err, ContractError::UnknownReplyId { id: 42 }));
    }

    fn pending(deps: &mut OwnedDeps<MockStorage, MockApi, MockQuerier>, id: u64) {
        let claim = PendingClaim {
            name: "alice.eth".to_string(),
            node: HexBinary::from(&namehash("alice.eth")[..]),
            did: "did:opendid:Qm1".to_string(),
            owner: Addr::unchecked("alice"),
        };
        PENDING_CLAIMS.save(deps.as_mut().storage, id, &claim).unwrap();
    }

    #[test]
    fn confirmed_batch_write_emits_claim_event() {
        let mut deps = setup();
        pending(&mut deps, BATCH_REPLY_ID_BASE);

        let msg = Reply {
            id: BATCH_REPLY_ID_BASE,
            result: SubMsgResult::Ok(SubMsgResponse {
                events: vec![],
                data: None,
            }),
        };
        let res = reply(deps.as_mut(), mock_env(), msg).unwrap();
        assert_eq!(res.events.len(), 1);
        assert_eq!(res.events[0].ty, "claim_did");
        assert!(res.events[0]
            .attributes
            .iter()
            .any(|a| a.key == "did" && a.value == "did:opendid:Qm1"));
        assert!(!PENDING_CLAIMS.has(deps.as_ref().storage, BATCH_REPLY_ID_BASE));
    }

    #[test]
    fn failed_batch_write_is_silent() {
        let mut deps = setup();
        pending(&mut deps, BATCH_REPLY_ID_BASE + 1);

        let msg = Reply {
            id: BATCH_REPLY_ID_BASE + 1,
            result: SubMsgResult::Err("Unauthorized".to_string()),
        };
        let res = reply(deps.as_mut(), mock_env(), msg).unwrap();
        assert!(res.events.is_empty());
        assert!(res.attributes.is_empty());
        assert!(!PENDING_CLAIMS.has(deps.as_ref().storage, BATCH_REPLY_ID_BASE + 1));
    }
}
