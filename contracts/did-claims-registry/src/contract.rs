use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, HexBinary, MessageInfo, Order,
    Response, StdResult,
};
use cw2::set_contract_version;
use cw_storage_plus::Bound;
use opendid_shared::{
    append_digest, did_hash, eth_signed_message_hash, recover_signer, registration_digest,
    EthAddress,
};

use crate::error::ContractError;
use crate::msg::{
    CidResponse, CidsResponse, ClaimTypeResponse, ClaimTypesResponse, ConfigResponse,
    CountResponse, DidOwnerResponse, ExecuteMsg, ExistsResponse, InstantiateMsg, MessageResponse,
    NonceResponse, QueryMsg, RegisteredResponse,
};
use crate::state::{
    ClaimType, Config, DidRecord, CLAIMS, CLAIM_COUNT, CLAIM_TYPES, CONFIG, DIDS, LATEST_CID,
    TYPED_CLAIMS, TYPED_CLAIM_COUNT, TYPED_LATEST_CID,
};

const CONTRACT_NAME: &str = "crates.io:did-claims-registry";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let config = Config {
        require_type_issuer: msg.require_type_issuer.unwrap_or(false),
    };
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("require_type_issuer", config.require_type_issuer.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::CreateClaimType { key, description } => {
            execute_create_claim_type(deps, env, info, key, description)
        }
        ExecuteMsg::RegisterDid {
            did,
            owner,
            signature,
        } => execute_register_did(deps, env, did, owner, signature),
        ExecuteMsg::AppendClaim {
            did,
            cid,
            claim_type,
            signature,
        } => execute_append_claim(deps, env, info, did, cid, claim_type, signature),
    }
}

pub fn execute_create_claim_type(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    key: String,
    description: String,
) -> Result<Response, ContractError> {
    if key.is_empty() {
        return Err(ContractError::EmptyKey {});
    }

    // First writer wins, claim types are never overwritten
    if CLAIM_TYPES.has(deps.storage, &key) {
        return Err(ContractError::AlreadyExists {});
    }

    let claim_type = ClaimType {
        key: key.clone(),
        issuer: info.sender.clone(),
        description,
        exists: true,
        created_at: env.block.time.seconds(),
    };
    CLAIM_TYPES.save(deps.storage, &key, &claim_type)?;

    Ok(Response::new()
        .add_attribute("method", "create_claim_type")
        .add_attribute("key", key)
        .add_attribute("issuer", info.sender)
        .add_attribute("created_at", claim_type.created_at.to_string()))
}

/// Recover the signer of `digest` and require it to be `expected`.
fn verify_signature(
    deps: Deps,
    digest: &[u8; 32],
    signature: &HexBinary,
    expected: &EthAddress,
) -> Result<(), ContractError> {
    match recover_signer(deps.api, digest, signature.as_slice()) {
        Some(signer) if signer == *expected => Ok(()),
        _ => Err(ContractError::Unauthorized {}),
    }
}

pub fn execute_register_did(
    deps: DepsMut,
    env: Env,
    did: String,
    owner: String,
    signature: HexBinary,
) -> Result<Response, ContractError> {
    if did.is_empty() {
        return Err(ContractError::EmptyDID {});
    }

    let hash = did_hash(&did);
    let existing = DIDS.may_load(deps.storage, &hash)?;
    if existing.as_ref().map_or(false, |record| record.is_registered) {
        return Err(ContractError::AlreadyRegistered {});
    }
    let owner_addr: EthAddress = owner.parse()?;
    let nonce = existing.map_or(0, |record| record.nonce);

    let digest = registration_digest(&did, env.contract.address.as_str(), nonce);
    verify_signature(deps.as_ref(), &digest, &signature, &owner_addr)?;

    let record = DidRecord {
        did: did.clone(),
        eth_owner: owner_addr.to_string(),
        is_registered: true,
        nonce: nonce + 1,
        registered_at: env.block.time.seconds(),
    };
    DIDS.save(deps.storage, &hash, &record)?;

    Ok(Response::new()
        .add_attribute("method", "register_did")
        .add_attribute("did", did)
        .add_attribute("did_hash", hex::encode(hash))
        .add_attribute("owner", record.eth_owner)
        .add_attribute("nonce", record.nonce.to_string()))
}

pub fn execute_append_claim(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    did: String,
    cid: String,
    claim_type: String,
    signature: HexBinary,
) -> Result<Response, ContractError> {
    if did.is_empty() {
        return Err(ContractError::EmptyDID {});
    }
    if cid.is_empty() {
        return Err(ContractError::EmptyCID {});
    }
    if claim_type.is_empty() {
        return Err(ContractError::EmptyClaimType {});
    }

    let hash = did_hash(&did);
    let mut record = DIDS
        .may_load(deps.storage, &hash)?
        .filter(|record| record.is_registered)
        .ok_or(ContractError::NotRegistered {})?;

    let type_record = CLAIM_TYPES
        .may_load(deps.storage, &claim_type)?
        .ok_or(ContractError::UnknownClaimType {})?;

    let config = CONFIG.load(deps.storage)?;
    if config.require_type_issuer && info.sender != type_record.issuer {
        return Err(ContractError::NotIssuer {});
    }

    let owner: EthAddress = record.eth_owner.parse()?;
    let digest = append_digest(
        &did,
        &cid,
        &claim_type,
        env.contract.address.as_str(),
        record.nonce,
    );
    verify_signature(deps.as_ref(), &digest, &signature, &owner)?;

    // Global log
    let index = CLAIM_COUNT
        .may_load(deps.storage, &hash)?
        .unwrap_or_default();
    CLAIMS.save(deps.storage, (hash.as_slice(), index), &cid)?;
    CLAIM_COUNT.save(deps.storage, &hash, &(index + 1))?;
    LATEST_CID.save(deps.storage, &hash, &cid)?;

    // Per-type log, indexed independently of the global one
    let type_key = (hash.as_slice(), claim_type.as_str());
    let type_index = TYPED_CLAIM_COUNT
        .may_load(deps.storage, type_key)?
        .unwrap_or_default();
    TYPED_CLAIMS.save(
        deps.storage,
        (hash.as_slice(), claim_type.as_str(), type_index),
        &cid,
    )?;
    TYPED_CLAIM_COUNT.save(deps.storage, type_key, &(type_index + 1))?;
    TYPED_LATEST_CID.save(deps.storage, type_key, &cid)?;

    record.nonce += 1;
    DIDS.save(deps.storage, &hash, &record)?;

    Ok(Response::new()
        .add_attribute("method", "append_claim")
        .add_attribute("did", did)
        .add_attribute("did_hash", hex::encode(hash))
        .add_attribute("cid", cid)
        .add_attribute("claim_type", claim_type)
        .add_attribute("index", index.to_string())
        .add_attribute("type_index", type_index.to_string())
        .add_attribute("submitter", info.sender)
        .add_attribute("nonce", record.nonce.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    let res = match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::ClaimTypeExists { key } => to_json_binary(&ExistsResponse {
            exists: CLAIM_TYPES.has(deps.storage, &key),
        }),
        QueryMsg::ClaimType { key } => to_json_binary(&query_claim_type(deps, key)?),
        QueryMsg::ListClaimTypes { start_after, limit } => {
            to_json_binary(&query_list_claim_types(deps, start_after, limit)?)
        }
        QueryMsg::IsRegistered { did } => to_json_binary(&RegisteredResponse {
            registered: load_registration(deps, &did)?.is_some(),
        }),
        QueryMsg::DidOwner { did } => to_json_binary(&DidOwnerResponse {
            owner: load_registration(deps, &did)?.map(|record| record.eth_owner),
        }),
        QueryMsg::Nonce { did } => to_json_binary(&NonceResponse {
            nonce: current_nonce(deps, &did)?,
        }),
        QueryMsg::RegistrationMessage { did } => {
            to_json_binary(&query_registration_message(deps, env, did)?)
        }
        QueryMsg::AppendMessage {
            did,
            cid,
            claim_type,
        } => to_json_binary(&query_append_message(deps, env, did, cid, claim_type)?),
        QueryMsg::Claim { did, index } => to_json_binary(&query_claim(deps, did, index)?),
        QueryMsg::AllClaims { did } => to_json_binary(&query_all_claims(deps, did)?),
        QueryMsg::ClaimsRange { did, start, end } => {
            to_json_binary(&query_claims_range(deps, did, start, end)?)
        }
        QueryMsg::ClaimsCount { did } => to_json_binary(&CountResponse {
            count: claim_count(deps, &did_hash(&did))?,
        }),
        QueryMsg::LatestCid { did } => to_json_binary(&CidResponse {
            cid: LATEST_CID
                .may_load(deps.storage, &did_hash(&did))?
                .unwrap_or_default(),
        }),
        QueryMsg::ClaimByType {
            did,
            claim_type,
            index,
        } => to_json_binary(&query_claim_by_type(deps, did, claim_type, index)?),
        QueryMsg::AllClaimsByType { did, claim_type } => {
            to_json_binary(&query_all_claims_by_type(deps, did, claim_type)?)
        }
        QueryMsg::ClaimsRangeByType {
            did,
            claim_type,
            start,
            end,
        } => to_json_binary(&query_claims_range_by_type(
            deps, did, claim_type, start, end,
        )?),
        QueryMsg::ClaimsCountByType { did, claim_type } => to_json_binary(&CountResponse {
            count: typed_claim_count(deps, &did_hash(&did), &claim_type)?,
        }),
        QueryMsg::LatestCidByType { did, claim_type } => to_json_binary(&CidResponse {
            cid: TYPED_LATEST_CID
                .may_load(deps.storage, (did_hash(&did).as_slice(), claim_type.as_str()))?
                .unwrap_or_default(),
        }),
        QueryMsg::HasClaimsOfType { did, claim_type } => to_json_binary(&ExistsResponse {
            exists: typed_claim_count(deps, &did_hash(&did), &claim_type)? > 0,
        }),
    }?;
    Ok(res)
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        require_type_issuer: config.require_type_issuer,
    })
}

fn claim_type_to_response(claim_type: ClaimType) -> ClaimTypeResponse {
    ClaimTypeResponse {
        key: claim_type.key,
        issuer: claim_type.issuer,
        description: claim_type.description,
        exists: claim_type.exists,
        created_at: claim_type.created_at,
    }
}

fn query_claim_type(deps: Deps, key: String) -> Result<ClaimTypeResponse, ContractError> {
    let claim_type = CLAIM_TYPES
        .may_load(deps.storage, &key)?
        .ok_or(ContractError::NotFound {})?;
    Ok(claim_type_to_response(claim_type))
}

fn query_list_claim_types(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<ClaimTypesResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.as_deref().map(Bound::exclusive);

    let claim_types = CLAIM_TYPES
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, claim_type)| claim_type_to_response(claim_type)))
        .collect::<StdResult<Vec<_>>>()?;

    Ok(ClaimTypesResponse { claim_types })
}

fn load_registration(deps: Deps, did: &str) -> StdResult<Option<DidRecord>> {
    Ok(DIDS
        .may_load(deps.storage, &did_hash(did))?
        .filter(|record| record.is_registered))
}

fn current_nonce(deps: Deps, did: &str) -> StdResult<u64> {
    Ok(DIDS
        .may_load(deps.storage, &did_hash(did))?
        .map_or(0, |record| record.nonce))
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
    env: Env,
    did: String,
) -> Result<MessageResponse, ContractError> {
    if did.is_empty() {
        return Err(ContractError::EmptyDID {});
    }
    let nonce = current_nonce(deps, &did)?;
    let digest = registration_digest(&did, env.contract.address.as_str(), nonce);
    Ok(message_response(did, nonce, digest))
}

fn query_append_message(
    deps: Deps,
    env: Env,
    did: String,
    cid: String,
    claim_type: String,
) -> Result<MessageResponse, ContractError> {
    if did.is_empty() {
        return Err(ContractError::EmptyDID {});
    }
    let nonce = current_nonce(deps, &did)?;
    let digest = append_digest(
        &did,
        &cid,
        &claim_type,
        env.contract.address.as_str(),
        nonce,
    );
    Ok(message_response(did, nonce, digest))
}

fn claim_count(deps: Deps, hash: &[u8]) -> StdResult<u64> {
    Ok(CLAIM_COUNT.may_load(deps.storage, hash)?.unwrap_or_default())
}

fn typed_claim_count(deps: Deps, hash: &[u8], claim_type: &str) -> StdResult<u64> {
    Ok(TYPED_CLAIM_COUNT
        .may_load(deps.storage, (hash, claim_type))?
        .unwrap_or_default())
}

/// Inclusive `[start, end]` must lie inside a log of `count` entries
fn check_range(start: u64, end: u64, count: u64) -> Result<(), ContractError> {
    if start > end || end >= count {
        return Err(ContractError::InvalidRange {});
    }
    Ok(())
}

fn query_claim(deps: Deps, did: String, index: u64) -> Result<CidResponse, ContractError> {
    let hash = did_hash(&did);
    check_range(index, index, claim_count(deps, &hash)?)?;
    let cid = CLAIMS.load(deps.storage, (hash.as_slice(), index))?;
    Ok(CidResponse { cid })
}

fn query_all_claims(deps: Deps, did: String) -> StdResult<CidsResponse> {
    let hash = did_hash(&did);
    let cids = CLAIMS
        .prefix(hash.as_slice())
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, cid)| cid))
        .collect::<StdResult<Vec<_>>>()?;
    Ok(CidsResponse { cids })
}

fn query_claims_range(
    deps: Deps,
    did: String,
    start: u64,
    end: u64,
) -> Result<CidsResponse, ContractError> {
    let hash = did_hash(&did);
    check_range(start, end, claim_count(deps, &hash)?)?;

    let cids = CLAIMS
        .prefix(hash.as_slice())
        .range(
            deps.storage,
            Some(Bound::inclusive(start)),
            Some(Bound::inclusive(end)),
            Order::Ascending,
        )
        .map(|item| item.map(|(_, cid)| cid))
        .collect::<StdResult<Vec<_>>>()?;
    Ok(CidsResponse { cids })
}

fn query_claim_by_type(
    deps: Deps,
    did: String,
    claim_type: String,
    index: u64,
) -> Result<CidResponse, ContractError> {
    let hash = did_hash(&did);
    check_range(index, index, typed_claim_count(deps, &hash, &claim_type)?)?;
    let cid = TYPED_CLAIMS.load(deps.storage, (hash.as_slice(), claim_type.as_str(), index))?;
    Ok(CidResponse { cid })
}

fn query_all_claims_by_type(
    deps: Deps,
    did: String,
    claim_type: String,
) -> StdResult<CidsResponse> {
    let hash = did_hash(&did);
    let cids = TYPED_CLAIMS
        .prefix((hash.as_slice(), claim_type.as_str()))
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, cid)| cid))
        .collect::<StdResult<Vec<_>>>()?;
    Ok(CidsResponse { cids })
}

fn query_claims_range_by_type(
    deps: Deps,
    did: String,
    claim_type: String,
    start: u64,
    end: u64,
) -> Result<CidsResponse, ContractError> {
    let hash = did_hash(&did);
    check_range(start, end, typed_claim_count(deps, &hash, &claim_type)?)?;

    let cids = TYPED_CLAIMS
        .prefix((hash.as_slice(), claim_type.as_str()))
        .range(
            deps.storage,
            Some(Bound::inclusive(start)),
            Some(Bound::inclusive(end)),
            Order::Ascending,
        )
        .map(|item| item.map(|(_, cid)| cid))
        .collect::<StdResult<Vec<_>>>()?;
    Ok(CidsResponse { cids })
}
