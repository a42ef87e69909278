//! OpenTix NFT Balance Lambda
//!
//! Handles GET /user/nft-balance. Looks up the ERC-1155 balances a wallet
//! holds for one token contract through the OKLink explorer and returns the
//! explorer's JSON unchanged. No token is required.

use aws_config::BehaviorVersion;
use lambda_http::http::Method;
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, Response};
use opentix_core::config::{origin_policy_from_env, read_secret};
use opentix_core::{deadline, request, telemetry, Error, OriginPolicy, QueryParams, Responder};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

const SECRET_ARN_ENV: &str = "OKLINK_SECRET_ARN";
const EXPLORER_URL: &str = "https://www.oklink.com/api/v5/explorer/nft/address-balance-fills";
const ACCESS_KEY_HEADER: &str = "Ok-Access-Key";
const PAGE_LIMIT: &str = "100";
const PROTOCOL_TYPE: &str = "token_1155";

const WALLET_KEY: &str = "wallet";
const CHAIN_KEY: &str = "chainShortName";
const CONTRACT_KEY: &str = "tokenContractAddress";

/// Shape of the explorer API key secret
#[derive(Deserialize)]
struct ExplorerSecret {
    #[serde(rename = "API_KEY")]
    api_key: String,
}

/// Wallet, chain and token contract named by the query string
#[derive(Debug, PartialEq)]
struct BalanceQuery {
    wallet: String,
    chain: String,
    contract: String,
}

impl BalanceQuery {
    fn from_query(params: &QueryParams) -> Result<Self, Error> {
        let required = |key: &str| {
            params
                .get(key)
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
                .ok_or_else(|| Error::Validation(format!("Missing {key} parameter")))
        };
        Ok(Self {
            wallet: required(WALLET_KEY)?,
            chain: required(CHAIN_KEY)?,
            contract: required(CONTRACT_KEY)?,
        })
    }
}

/// OKLink explorer client
struct Explorer {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Explorer {
    fn request(&self, query: &BalanceQuery) -> reqwest::Result<reqwest::Request> {
        self.http
            .get(&self.base_url)
            .header(ACCESS_KEY_HEADER, &self.api_key)
            .query(&[
                ("chainShortName", query.chain.as_str()),
                ("address", query.wallet.as_str()),
                ("tokenContractAddress", query.contract.as_str()),
                ("limit", PAGE_LIMIT),
                ("protocolType", PROTOCOL_TYPE),
            ])
            .build()
    }

    async fn balances(&self, query: &BalanceQuery) -> Result<Value, Error> {
        let request = self
            .request(query)
            .map_err(|e| Error::Internal(format!("failed to build explorer request: {e}")))?;
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| Error::Upstream(format!("explorer request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!("explorer answered {status}")));
        }
        response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("explorer response is not JSON: {e}")))
    }
}

async fn serve(explorer: &Explorer, responder: &Responder, event: &Request) -> Result<Response<Body>, Error> {
    if *event.method() != Method::GET {
        return Err(Error::MethodNotAllowed);
    }
    let query = BalanceQuery::from_query(&request::query_params(event))?;
    info!(wallet = %query.wallet, chain = %query.chain, contract = %query.contract, "Looking up NFT balances");

    let balances = deadline::within(request::deadline(event), "explorer request", explorer.balances(&query)).await?;
    responder.json(200, &balances)
}

async fn handler(policy: &OriginPolicy, explorer: &Explorer, event: Request) -> Result<Response<Body>, LambdaError> {
    let responder = Responder::new(policy, &event);
    let outcome = serve(explorer, &responder, &event).await;
    Ok(responder.finish(outcome)?)
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    telemetry::init();

    let policy = origin_policy_from_env();
    let secret_arn = std::env::var(SECRET_ARN_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("{SECRET_ARN_ENV} must be set")))?;
    let sdk = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let secret: ExplorerSecret = read_secret(&sdk, &secret_arn).await?;
    if secret.api_key.trim().is_empty() {
        return Err(Error::Config("explorer API_KEY is empty".to_string()).into());
    }

    let explorer = Explorer {
        http: reqwest::Client::new(),
        base_url: EXPLORER_URL.to_string(),
        api_key: secret.api_key,
    };

    let (policy, explorer) = (&policy, &explorer);
    run(service_fn(move |event: Request| async move { handler(policy, explorer, event).await })).await
}
