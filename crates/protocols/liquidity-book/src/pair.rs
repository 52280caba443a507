//! Token Pairs
//!
//! Canonically ordered token pairs, pair-combination generation for routing,
//! LBPair reads through the chain client, and liquidity add/remove math.

use evm_rpc_client::decode::{as_address, as_array, as_bool, as_u128, as_u32, as_u64, field};
use evm_rpc_client::{ChainClient, ContractAbi, ContractCall};
use lb_core::{Address, ChainConfig, ChainError, Contract, Token};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::bin::get_id_slippage_from_price_slippage;
use crate::distribution::get_liquidity_config;
use crate::fraction::{amount_with_slippage_min, Percent, TokenAmount};
use crate::state::{
    AddLiquidityParameters, BinAmounts, BinReserves, FeeParameters, LbError, LbPairInfo,
    LiquidityDistribution, PoolVersion, RemoveLiquidityAmounts, ReservesAndId,
};

/// Two tokens in canonical order (`token0` sorts before `token1`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pair {
    pub token0: Token,
    pub token1: Token,
}

impl Pair {
    pub fn new(token_a: Token, token_b: Token) -> Self {
        if token_b.sorts_before(&token_a) {
            Self {
                token0: token_b,
                token1: token_a,
            }
        } else {
            Self {
                token0: token_a,
                token1: token_b,
            }
        }
    }

    /// Structural equality on the two addresses
    pub fn equals(&self, other: &Pair) -> bool {
        self.token0.address == other.token0.address && self.token1.address == other.token1.address
    }

    pub fn involves(&self, token: &Token) -> bool {
        self.token0 == *token || self.token1 == *token
    }

    /// The token on the other side of `token`, if the pair contains it
    pub fn other(&self, token: &Token) -> Option<&Token> {
        if self.token0 == *token {
            Some(&self.token1)
        } else if self.token1 == *token {
            Some(&self.token0)
        } else {
            None
        }
    }

    /// Every token pair a route between `input` and `output` could use.
    ///
    /// Produces the direct pair, input and output against every base, and
    /// every base against every other base. Self-pairs are dropped;
    /// duplicates are not.
    pub fn create_all_token_pairs(
        input: &Token,
        output: &Token,
        bases: &[Token],
    ) -> Vec<(Token, Token)> {
        let base_pairs = bases
            .iter()
            .flat_map(|base| bases.iter().map(move |other| (base.clone(), other.clone())));

        std::iter::once((input.clone(), output.clone()))
            .chain(bases.iter().map(|base| (input.clone(), base.clone())))
            .chain(bases.iter().map(|base| (output.clone(), base.clone())))
            .chain(base_pairs)
            .filter(|(t0, t1)| t0.address != t1.address)
            .collect()
    }

    /// Build pairs from token tuples, keeping the first of each duplicate
    pub fn init_pairs(token_pairs: &[(Token, Token)]) -> Vec<Pair> {
        let mut unique: Vec<Pair> = Vec::new();
        for (a, b) in token_pairs {
            let pair = Pair::new(a.clone(), b.clone());
            if !unique.iter().any(|existing| existing.equals(&pair)) {
                unique.push(pair);
            }
        }
        unique
    }

    fn token_args(&self) -> Vec<Value> {
        vec![json!(self.token0.address), json!(self.token1.address)]
    }

    fn factory_call(
        &self,
        version: PoolVersion,
        chain: &ChainConfig,
        function: &str,
    ) -> Result<ContractCall, LbError> {
        let (abi, contract) = match version {
            PoolVersion::V2 => (ContractAbi::LbFactory, Contract::LbFactory),
            PoolVersion::V21 => (ContractAbi::LbFactoryV21, Contract::LbFactoryV21),
            PoolVersion::V1 => return Err(LbError::UnsupportedVersion(version)),
        };
        let address = chain.address(contract)?;
        Ok(ContractCall::new(abi, address, function).with_args(self.token_args()))
    }

    /// All LBPairs deployed for this pair, one per bin step
    pub async fn fetch_available_lb_pairs(
        &self,
        version: PoolVersion,
        client: &dyn ChainClient,
        chain: &ChainConfig,
    ) -> Result<Vec<LbPairInfo>, LbError> {
        let call = self.factory_call(version, chain, "getAllLBPairs")?;
        let value = client.read_contract(&call).await?;
        let pairs = as_array(&value)?
            .iter()
            .map(decode_lb_pair_info)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            token0 = %self.token0,
            token1 = %self.token1,
            count = pairs.len(),
            "Fetched available LBPairs"
        );
        Ok(pairs)
    }

    /// The LBPair for one bin step. A zero `lb_pair` address means none exists.
    pub async fn fetch_lb_pair(
        &self,
        bin_step: u16,
        version: PoolVersion,
        client: &dyn ChainClient,
        chain: &ChainConfig,
    ) -> Result<LbPairInfo, LbError> {
        let mut call = self.factory_call(version, chain, "getLBPairInformation")?;
        call.args.push(json!(bin_step));
        let value = client.read_contract(&call).await?;
        Ok(decode_lb_pair_info(&value)?)
    }

    pub async fn get_lb_pair_reserves_and_id(
        lb_pair: Address,
        version: PoolVersion,
        client: &dyn ChainClient,
    ) -> Result<ReservesAndId, LbError> {
        match version {
            PoolVersion::V21 => {
                let reserves_call = ContractCall::new(ContractAbi::LbPairV21, lb_pair, "getReserves");
                let active_call = ContractCall::new(ContractAbi::LbPairV21, lb_pair, "getActiveId");
                let (reserves, active_id) = futures::try_join!(
                    client.read_contract(&reserves_call),
                    client.read_contract(&active_call)
                )?;
                Ok(ReservesAndId {
                    reserve_x: as_u128(field(&reserves, "reserveX", 0)?)?,
                    reserve_y: as_u128(field(&reserves, "reserveY", 1)?)?,
                    active_id: as_u32(&active_id)?,
                })
            }
            PoolVersion::V2 => {
                let call = ContractCall::new(ContractAbi::LbPair, lb_pair, "getReservesAndId");
                let value = client.read_contract(&call).await?;
                Ok(ReservesAndId {
                    reserve_x: as_u128(field(&value, "reserveX", 0)?)?,
                    reserve_y: as_u128(field(&value, "reserveY", 1)?)?,
                    active_id: as_u32(field(&value, "activeId", 2)?)?,
                })
            }
            PoolVersion::V1 => Err(LbError::UnsupportedVersion(version)),
        }
    }

    pub async fn get_fee_parameters(
        lb_pair: Address,
        client: &dyn ChainClient,
    ) -> Result<FeeParameters, LbError> {
        let call = ContractCall::new(ContractAbi::LbPair, lb_pair, "feeParameters");
        let value = client.read_contract(&call).await?;
        Ok(decode_fee_parameters(&value)?)
    }

    /// Pro-rata token amounts for `liquidity` shares in each of `bin_ids`.
    ///
    /// Bins at or below the active bin contribute Y, bins at or above
    /// contribute X; the active bin contributes both.
    pub fn calculate_amounts(
        bin_ids: &[u32],
        active_id: u32,
        bins: &[BinReserves],
        total_supplies: &[u128],
        liquidity: &[u128],
    ) -> Result<BinAmounts, LbError> {
        check_len("bin reserves", bin_ids.len(), bins.len())?;
        check_len("total supplies", bin_ids.len(), total_supplies.len())?;
        check_len("liquidity amounts", bin_ids.len(), liquidity.len())?;

        let mut total_x = BigInt::from(0);
        let mut total_y = BigInt::from(0);

        for (i, &bin_id) in bin_ids.iter().enumerate() {
            if total_supplies[i] == 0 {
                return Err(LbError::EmptyBinSupply { bin_id });
            }
            let share = BigInt::from(liquidity[i]);
            let supply = BigInt::from(total_supplies[i]);

            if bin_id <= active_id {
                total_y += &share * BigInt::from(bins[i].reserve_y) / &supply;
            }
            if bin_id >= active_id {
                total_x += &share * BigInt::from(bins[i].reserve_x) / &supply;
            }
        }

        Ok(BinAmounts {
            amount_x: total_x.to_u128().ok_or(LbError::Overflow("amount x"))?,
            amount_y: total_y.to_u128().ok_or(LbError::Overflow("amount y"))?,
        })
    }

    /// Arguments for an addLiquidity call using one of the canned shapes
    pub fn add_liquidity_parameters(
        &self,
        bin_step: u16,
        token0_amount: &TokenAmount,
        token1_amount: &TokenAmount,
        amount_slippage: &Percent,
        price_slippage: &Percent,
        distribution: LiquidityDistribution,
    ) -> Result<AddLiquidityParameters, LbError> {
        let token0_is_x = token0_amount.token.sorts_before(&token1_amount.token);
        let (x, y) = if token0_is_x {
            (token0_amount, token1_amount)
        } else {
            (token1_amount, token0_amount)
        };

        let id_slippage = get_id_slippage_from_price_slippage(price_slippage.to_f64(), bin_step);
        let shape = get_liquidity_config(distribution);

        Ok(AddLiquidityParameters {
            token_x: x.token.clone(),
            token_y: y.token.clone(),
            bin_step,
            amount_x: x.raw,
            amount_y: y.raw,
            amount_x_min: amount_with_slippage_min(x.raw, amount_slippage)?,
            amount_y_min: amount_with_slippage_min(y.raw, amount_slippage)?,
            id_slippage,
            delta_ids: shape.delta_ids,
            distribution_x: shape.distribution_x,
            distribution_y: shape.distribution_y,
        })
    }

    /// Expected and minimum amounts for removing `amounts_to_remove` shares
    pub fn calculate_amounts_to_remove(
        &self,
        user_position_ids: &[u32],
        active_id: u32,
        bins: &[BinReserves],
        total_supplies: &[u128],
        amounts_to_remove: &[u128],
        amount_slippage: &Percent,
    ) -> Result<RemoveLiquidityAmounts, LbError> {
        let amounts = Self::calculate_amounts(
            user_position_ids,
            active_id,
            bins,
            total_supplies,
            amounts_to_remove,
        )?;

        Ok(RemoveLiquidityAmounts {
            amount_x: amounts.amount_x,
            amount_y: amounts.amount_y,
            amount_x_min: amount_with_slippage_min(amounts.amount_x, amount_slippage)?,
            amount_y_min: amount_with_slippage_min(amounts.amount_y, amount_slippage)?,
        })
    }
}

impl PartialEq for Pair {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Pair {}

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            self.token0.display_symbol(),
            self.token1.display_symbol()
        )
    }
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), LbError> {
    if expected == found {
        Ok(())
    } else {
        Err(LbError::LengthMismatch {
            what,
            expected,
            found,
        })
    }
}

fn decode_lb_pair_info(value: &Value) -> Result<LbPairInfo, ChainError> {
    // v2.1 factories name the last flag `ignoredForRouting`
    let blacklisted = field(value, "isBlacklisted", 3)
        .or_else(|_| field(value, "ignoredForRouting", 3))?;
    let bin_step = as_u64(field(value, "binStep", 0)?)?;

    Ok(LbPairInfo {
        bin_step: u16::try_from(bin_step)
            .map_err(|_| ChainError::Decode(format!("bin step {} out of range", bin_step)))?,
        lb_pair: as_address(field(value, "LBPair", 1)?)?,
        created_by_owner: as_bool(field(value, "createdByOwner", 2)?)?,
        is_blacklisted: as_bool(blacklisted)?,
    })
}

fn decode_fee_parameters(value: &Value) -> Result<FeeParameters, ChainError> {
    let bin_step = as_u64(field(value, "binStep", 0)?)?;
    Ok(FeeParameters {
        bin_step: u16::try_from(bin_step)
            .map_err(|_| ChainError::Decode(format!("bin step {} out of range", bin_step)))?,
        base_factor: as_u64(field(value, "baseFactor", 1)?)?,
        filter_period: as_u64(field(value, "filterPeriod", 2)?)?,
        decay_period: as_u64(field(value, "decayPeriod", 3)?)?,
        reduction_factor: as_u64(field(value, "reductionFactor", 4)?)?,
        variable_fee_control: as_u64(field(value, "variableFeeControl", 5)?)?,
        protocol_share: as_u64(field(value, "protocolShare", 6)?)?,
        max_volatility_accumulated: as_u64(field(value, "maxVolatilityAccumulated", 7)?)?,
        volatility_accumulated: as_u64(field(value, "volatilityAccumulated", 8)?)?,
        volatility_reference: as_u64(field(value, "volatilityReference", 9)?)?,
        index_ref: as_u64(field(value, "indexRef", 10)?)?,
        time: as_u64(field(value, "time", 11)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::fixed_point::PRECISION;
    use evm_rpc_client::FixtureClient;
    use lb_core::ChainId;

    fn token(last: u8, symbol: &str, decimals: u8) -> Token {
        let mut bytes = [0u8; 20];
        bytes[0] = 0xaa;
        bytes[19] = last;
        Token::new(ChainId::FUJI, Address::from_bytes(bytes), decimals, symbol, symbol)
    }

    fn usdc() -> Token {
        token(1, "USDC", 6)
    }

    fn usdt() -> Token {
        token(2, "USDT", 6)
    }

    fn wavax() -> Token {
        token(3, "WAVAX", 18)
    }

    fn fuji_v21() -> ChainConfig {
        let mut chain = ChainConfig::fuji();
        chain.addresses.lb_factory_v21 =
            Some(Address::from_hex_literal("0x8e42f2F4101563bF679975178e880FD87d3eFd4e"));
        chain
    }

    #[test]
    fn test_pair_order_is_canonical() {
        let a = Pair::new(usdc(), wavax());
        let b = Pair::new(wavax(), usdc());
        assert!(a.equals(&b));
        assert_eq!(a.token0, usdc());
        assert_eq!(b.token0, usdc());
        assert!(!Pair::new(usdc(), usdt()).equals(&a));
    }

    #[test]
    fn test_pair_other_token() {
        let pair = Pair::new(usdc(), wavax());
        assert_eq!(pair.other(&usdc()), Some(&wavax()));
        assert_eq!(pair.other(&wavax()), Some(&usdc()));
        assert_eq!(pair.other(&usdt()), None);
        assert!(pair.involves(&wavax()));
    }

    #[test]
    fn test_create_all_token_pairs_and_dedup() {
        let input = token(10, "IN", 18);
        let output = token(11, "OUT", 18);
        let bases = vec![usdc(), usdt()];

        let token_pairs = Pair::create_all_token_pairs(&input, &output, &bases);
        assert_eq!(token_pairs.len(), 7);
        assert!(token_pairs.iter().all(|(a, b)| a.address != b.address));

        let pairs = Pair::init_pairs(&token_pairs);
        assert_eq!(pairs.len(), 6);
        // first occurrence keeps its position
        assert!(pairs[0].equals(&Pair::new(input.clone(), output.clone())));
        assert!(pairs[5].equals(&Pair::new(usdc(), usdt())));
    }

    #[test]
    fn test_create_all_token_pairs_drops_self_pairs() {
        let bases = vec![usdc(), wavax()];
        let token_pairs = Pair::create_all_token_pairs(&usdc(), &wavax(), &bases);
        assert_eq!(token_pairs.len(), 5);
        assert_eq!(Pair::init_pairs(&token_pairs).len(), 1);
    }

    #[test]
    fn test_calculate_amounts_fixture() {
        let bin_ids = [8_376_297, 8_376_298, 8_376_299];
        let bins = [
            BinReserves {
                reserve_x: 0,
                reserve_y: 420_588_469,
            },
            BinReserves {
                reserve_x: 16_644_559_640_250_455_745,
                reserve_y: 75_236_144,
            },
            BinReserves {
                reserve_x: 20_272_546_666_666_666_600,
                reserve_y: 0,
            },
        ];
        let supplies = [420_588_467, 421_669_945, 422_789_291];
        let liquidity = [13_333_333, 13_600_300, 13_903_508];

        let amounts =
            Pair::calculate_amounts(&bin_ids, 8_376_298, &bins, &supplies, &liquidity).unwrap();
        assert_eq!(amounts.amount_x, 1_203_510_695_082_363_975);
        assert_eq!(amounts.amount_y, 15_759_956);
    }

    #[test]
    fn test_calculate_amounts_single_sided_bins() {
        let below = Pair::calculate_amounts(
            &[8_376_297],
            8_376_298,
            &[BinReserves {
                reserve_x: 0,
                reserve_y: 420_588_469,
            }],
            &[420_588_467],
            &[13_333_333],
        )
        .unwrap();
        assert_eq!(below.amount_x, 0);
        assert_eq!(below.amount_y, 13_333_333);

        let above = Pair::calculate_amounts(
            &[8_376_299],
            8_376_298,
            &[BinReserves {
                reserve_x: 20_272_546_666_666_666_600,
                reserve_y: 0,
            }],
            &[422_789_291],
            &[13_903_508],
        )
        .unwrap();
        assert_eq!(above.amount_x, 666_666_636_928_543_519);
        assert_eq!(above.amount_y, 0);
    }

    #[test]
    fn test_calculate_amounts_rejects_bad_input() {
        let bins = [BinReserves {
            reserve_x: 1,
            reserve_y: 1,
        }];
        assert!(matches!(
            Pair::calculate_amounts(&[1, 2], 1, &bins, &[1, 1], &[1, 1]),
            Err(LbError::LengthMismatch { .. })
        ));
        assert!(matches!(
            Pair::calculate_amounts(&[1], 1, &bins, &[0], &[1]),
            Err(LbError::EmptyBinSupply { bin_id: 1 })
        ));
    }

    #[test]
    fn test_add_liquidity_parameters() {
        let pair = Pair::new(wavax(), usdc());
        let avax_amount = TokenAmount::new(wavax(), 2 * PRECISION);
        let usdc_amount = TokenAmount::new(usdc(), 40_000_000);

        let params = pair
            .add_liquidity_parameters(
                25,
                &avax_amount,
                &usdc_amount,
                &Percent::from_bps(50),
                &Percent::from_bps(500),
                LiquidityDistribution::Spot,
            )
            .unwrap();

        // usdc sorts first so it becomes token X
        assert_eq!(params.token_x, usdc());
        assert_eq!(params.amount_x, 40_000_000);
        assert_eq!(params.amount_x_min, 39_800_995);
        assert_eq!(params.amount_y, 2 * PRECISION);
        assert_eq!(params.id_slippage, 19);
        assert_eq!(params.delta_ids.len(), 11);
        assert_eq!(params.distribution_x.len(), params.delta_ids.len());
    }

    #[test]
    fn test_calculate_amounts_to_remove() {
        let pair = Pair::new(usdc(), usdt());
        let removed = pair
            .calculate_amounts_to_remove(
                &[100, 101],
                100,
                &[
                    BinReserves {
                        reserve_x: 1_000,
                        reserve_y: 2_000,
                    },
                    BinReserves {
                        reserve_x: 4_000,
                        reserve_y: 0,
                    },
                ],
                &[100, 100],
                &[50, 25],
                &Percent::from_bps(100),
            )
            .unwrap();

        // active bin: x 500, y 1000; bin above: x 1000
        assert_eq!(removed.amount_x, 1_500);
        assert_eq!(removed.amount_y, 1_000);
        assert_eq!(removed.amount_x_min, 1_485);
        assert_eq!(removed.amount_y_min, 990);
    }

    #[tokio::test]
    async fn test_fetch_lb_pair_reports_missing_pair_without_error() {
        let chain = fuji_v21();
        let pair = Pair::new(usdc(), usdt());
        let call = pair
            .factory_call(PoolVersion::V21, &chain, "getLBPairInformation")
            .unwrap()
            .with_args(vec![
                json!(pair.token0.address),
                json!(pair.token1.address),
                json!(5),
            ]);
        let client = FixtureClient::new().with_response(
            &call,
            json!({
                "binStep": 5,
                "LBPair": "0x0000000000000000000000000000000000000000",
                "createdByOwner": false,
                "ignoredForRouting": false
            }),
        );

        let info = pair
            .fetch_lb_pair(5, PoolVersion::V21, &client, &chain)
            .await
            .unwrap();
        assert_eq!(info.bin_step, 5);
        assert!(!info.exists());
    }

    #[tokio::test]
    async fn test_fetch_available_lb_pairs() {
        let chain = ChainConfig::fuji();
        let pair = Pair::new(usdc(), wavax());
        let call = pair
            .factory_call(PoolVersion::V2, &chain, "getAllLBPairs")
            .unwrap();
        let client = FixtureClient::new().with_response(
            &call,
            json!([
                [10, "0x00000000000000000000000000000000000000A1", true, false],
                [20, "0x00000000000000000000000000000000000000a2", false, false]
            ]),
        );

        let pairs = pair
            .fetch_available_lb_pairs(PoolVersion::V2, &client, &chain)
            .await
            .unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].bin_step, 10);
        assert!(pairs[0].created_by_owner);
        assert!(pairs.iter().all(LbPairInfo::exists));
    }

    #[tokio::test]
    async fn test_factory_requires_configured_address() {
        let pair = Pair::new(usdc(), wavax());
        let err = pair
            .fetch_available_lb_pairs(PoolVersion::V21, &FixtureClient::new(), &ChainConfig::fuji())
            .await
            .unwrap_err();
        assert!(matches!(err, LbError::Config(_)));
    }

    #[tokio::test]
    async fn test_reserves_and_id_by_version() {
        let lb_pair = Address::from_hex_literal("0x00000000000000000000000000000000000000b1");
        let client = FixtureClient::new()
            .with_response(
                &ContractCall::new(ContractAbi::LbPairV21, lb_pair, "getReserves"),
                json!(["1000", "2000"]),
            )
            .with_response(
                &ContractCall::new(ContractAbi::LbPairV21, lb_pair, "getActiveId"),
                json!(8_388_608),
            )
            .with_response(
                &ContractCall::new(ContractAbi::LbPair, lb_pair, "getReservesAndId"),
                json!({ "reserveX": "3000", "reserveY": "4000", "activeId": "8388600" }),
            );

        let v21 = Pair::get_lb_pair_reserves_and_id(lb_pair, PoolVersion::V21, &client)
            .await
            .unwrap();
        assert_eq!(
            v21,
            ReservesAndId {
                reserve_x: 1000,
                reserve_y: 2000,
                active_id: 8_388_608
            }
        );

        let v2 = Pair::get_lb_pair_reserves_and_id(lb_pair, PoolVersion::V2, &client)
            .await
            .unwrap();
        assert_eq!(v2.active_id, 8_388_600);
        assert_eq!(v2.reserve_y, 4000);
    }

    #[tokio::test]
    async fn test_get_fee_parameters() {
        let lb_pair = Address::from_hex_literal("0x00000000000000000000000000000000000000b2");
        let client = FixtureClient::new().with_response(
            &ContractCall::new(ContractAbi::LbPair, lb_pair, "feeParameters"),
            json!({
                "binStep": 10, "baseFactor": 5000, "filterPeriod": 30, "decayPeriod": 600,
                "reductionFactor": 5000, "variableFeeControl": 40000, "protocolShare": 1000,
                "maxVolatilityAccumulated": 350000, "volatilityAccumulated": 1000,
                "volatilityReference": 0, "indexRef": 8388608, "time": 1700000000
            }),
        );

        let params = Pair::get_fee_parameters(lb_pair, &client).await.unwrap();
        assert_eq!(params.bin_step, 10);
        assert_eq!(params.variable_fee_control, 40_000);
        let fees = crate::fees::calculate_fee_percentage(&params);
        assert_eq!(fees.variable_fee, 4_000_800);
    }
}
