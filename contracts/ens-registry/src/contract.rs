use cosmwasm_std::{
    entry_point, to_json_binary, Addr, Binary, Deps, DepsMut, Env, HexBinary, MessageInfo,
    Response, StdResult,
};
use cw2::set_contract_version;
use opendid_shared::{node_from_slice, subnode, Node, ZERO_NODE};

use crate::error::ContractError;
use crate::msg::{
    ApprovalResponse, ExecuteMsg, InstantiateMsg, OwnerResponse, QueryMsg, ResolverResponse,
    TextResponse,
};
use crate::state::{NodeRecord, OPERATORS, RECORDS, TEXTS};

const CONTRACT_NAME: &str = "crates.io:ens-registry";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    _msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let root = NodeRecord {
        owner: info.sender.clone(),
        resolver: None,
    };
    RECORDS.save(deps.storage, &ZERO_NODE, &root)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("root_owner", info.sender))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::SetOwner { node, owner } => execute_set_owner(deps, info, node, owner),
        ExecuteMsg::SetSubnodeOwner { node, label, owner } => {
            execute_set_subnode_owner(deps, info, node, label, owner)
        }
        ExecuteMsg::SetResolver { node, resolver } => {
            execute_set_resolver(deps, info, node, resolver)
        }
        ExecuteMsg::SetApprovalForAll { operator, approved } => {
            execute_set_approval_for_all(deps, info, operator, approved)
        }
        ExecuteMsg::SetText { node, key, value } => {
            execute_set_text(deps, info, node, key, value)
        }
    }
}

fn node_hex(node: &Node) -> String {
    HexBinary::from(&node[..]).to_hex()
}

/// Load the record of `node` and check that `sender` owns it or is an
/// operator approved by the owner.
fn authorised_record(
    deps: Deps,
    node: &Node,
    sender: &Addr,
) -> Result<NodeRecord, ContractError> {
    let record = RECORDS
        .may_load(deps.storage, node)?
        .ok_or(ContractError::Unauthorized {})?;

    if record.owner == *sender {
        return Ok(record);
    }
    let approved = OPERATORS
        .may_load(deps.storage, (&record.owner, sender))?
        .unwrap_or(false);
    if !approved {
        return Err(ContractError::Unauthorized {});
    }
    Ok(record)
}

pub fn execute_set_owner(
    deps: DepsMut,
    info: MessageInfo,
    node: HexBinary,
    owner: String,
) -> Result<Response, ContractError> {
    let node = node_from_slice(node.as_slice())?;
    let owner_addr = deps.api.addr_validate(&owner)?;
    let mut record = authorised_record(deps.as_ref(), &node, &info.sender)?;

    record.owner = owner_addr;
    RECORDS.save(deps.storage, &node, &record)?;

    Ok(Response::new()
        .add_attribute("method", "set_owner")
        .add_attribute("node", node_hex(&node))
        .add_attribute("owner", owner))
}

pub fn execute_set_subnode_owner(
    deps: DepsMut,
    info: MessageInfo,
    node: HexBinary,
    label: String,
    owner: String,
) -> Result<Response, ContractError> {
    if label.is_empty() {
        return Err(ContractError::EmptyLabel {});
    }
    let parent = node_from_slice(node.as_slice())?;
    let owner_addr = deps.api.addr_validate(&owner)?;
    authorised_record(deps.as_ref(), &parent, &info.sender)?;

    let child = subnode(&parent, &label);
    let resolver = RECORDS
        .may_load(deps.storage, &child)?
        .and_then(|record| record.resolver);
    RECORDS.save(
        deps.storage,
        &child,
        &NodeRecord {
            owner: owner_addr,
            resolver,
        },
    )?;

    Ok(Response::new()
        .add_attribute("method", "set_subnode_owner")
        .add_attribute("node", node_hex(&child))
        .add_attribute("label", label)
        .add_attribute("owner", owner))
}

pub fn execute_set_resolver(
    deps: DepsMut,
    info: MessageInfo,
    node: HexBinary,
    resolver: Option<String>,
) -> Result<Response, ContractError> {
    let node = node_from_slice(node.as_slice())?;
    let resolver_addr = resolver
        .map(|r| deps.api.addr_validate(&r))
        .transpose()?;
    let mut record = authorised_record(deps.as_ref(), &node, &info.sender)?;

    record.resolver = resolver_addr.clone();
    RECORDS.save(deps.storage, &node, &record)?;

    Ok(Response::new()
        .add_attribute("method", "set_resolver")
        .add_attribute("node", node_hex(&node))
        .add_attribute(
            "resolver",
            resolver_addr.map(|a| a.to_string()).unwrap_or_default(),
        ))
}

pub fn execute_set_approval_for_all(
    deps: DepsMut,
    info: MessageInfo,
    operator: String,
    approved: bool,
) -> Result<Response, ContractError> {
    let operator_addr = deps.api.addr_validate(&operator)?;
    OPERATORS.save(deps.storage, (&info.sender, &operator_addr), &approved)?;

    Ok(Response::new()
        .add_attribute("method", "set_approval_for_all")
        .add_attribute("owner", info.sender)
        .add_attribute("operator", operator)
        .add_attribute("approved", approved.to_string()))
}

pub fn execute_set_text(
    deps: DepsMut,
    info: MessageInfo,
    node: HexBinary,
    key: String,
    value: String,
) -> Result<Response, ContractError> {
    let node = node_from_slice(node.as_slice())?;
    authorised_record(deps.as_ref(), &node, &info.sender)?;

    TEXTS.save(deps.storage, (&node[..], key.as_str()), &value)?;

    Ok(Response::new()
        .add_attribute("method", "set_text")
        .add_attribute("node", node_hex(&node))
        .add_attribute("key", key)
        .add_attribute("value", value))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Owner { node } => to_json_binary(&query_owner(deps, node)?),
        QueryMsg::Resolver { node } => to_json_binary(&query_resolver(deps, node)?),
        QueryMsg::Text { node, key } => to_json_binary(&query_text(deps, node, key)?),
        QueryMsg::IsApprovedForAll { owner, operator } => {
            to_json_binary(&query_is_approved_for_all(deps, owner, operator)?)
        }
    }
}

fn load_record(deps: Deps, node: &HexBinary) -> StdResult<Option<NodeRecord>> {
    RECORDS.may_load(deps.storage, node.as_slice())
}

fn query_owner(deps: Deps, node: HexBinary) -> StdResult<OwnerResponse> {
    let owner = load_record(deps, &node)?.map(|record| record.owner);
    Ok(OwnerResponse { owner })
}

fn query_resolver(deps: Deps, node: HexBinary) -> StdResult<ResolverResponse> {
    let resolver = load_record(deps, &node)?.and_then(|record| record.resolver);
    Ok(ResolverResponse { resolver })
}

fn query_text(deps: Deps, node: HexBinary, key: String) -> StdResult<TextResponse> {
    let value = TEXTS
        .may_load(deps.storage, (node.as_slice(), key.as_str()))?
        .unwrap_or_default();
    Ok(TextResponse { value })
}

fn query_is_approved_for_all(
    deps: Deps,
    owner: String,
    operator: String,
) -> StdResult<ApprovalResponse> {
    let owner_addr = deps.api.addr_validate(&owner)?;
    let operator_addr = deps.api.addr_validate(&operator)?;
    let approved = OPERATORS
        .may_load(deps.storage, (&owner_addr, &operator_addr))?
        .unwrap_or(false);
    Ok(ApprovalResponse { approved })
}
