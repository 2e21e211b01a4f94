//! In-process liquidity venue: proportional pool, LP mint, gauge staking and
//! a fixed payout per reward claim. Speaks the same instruction layout and
//! account formats the program reads through `tranche_vault::venue`.

use anchor_lang::solana_program::system_instruction;
use anchor_lang::{AnchorDeserialize, AnchorSerialize};
use anchor_spl::token::spl_token;
use solana_program::{
    account_info::AccountInfo,
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program::invoke_signed,
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    sysvar::Sysvar,
};
use tranche_vault::venue::{
    discriminators, seeds, AddLiquidityArgs, GaugeAmountArgs, RemoveLiquidityArgs,
    VenueAccountDeserialize, VenueGauge, VenuePool, VenueStake,
};

/// Reward paid by `get_reward` to any non-empty stake
pub const REWARD_PER_CLAIM: u64 = 1_000_000;

pub const ERR_SLIPPAGE: u32 = 1;
pub const ERR_EXPIRED: u32 = 2;
pub const ERR_STAKE: u32 = 3;

pub fn process_venue(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    if data.len() < 8 {
        return Err(ProgramError::InvalidInstructionData);
    }
    let (tag, args) = data.split_at(8);
    let tag: [u8; 8] = tag
        .try_into()
        .map_err(|_| ProgramError::InvalidInstructionData)?;

    match tag {
        discriminators::ADD_LIQUIDITY => add_liquidity(accounts, decode(args)?),
        discriminators::REMOVE_LIQUIDITY => remove_liquidity(accounts, decode(args)?),
        discriminators::GAUGE_DEPOSIT => gauge_deposit(program_id, accounts, decode(args)?),
        discriminators::GAUGE_WITHDRAW => gauge_withdraw(accounts, decode(args)?),
        discriminators::GET_REWARD => get_reward(accounts),
        _ => Err(ProgramError::InvalidInstructionData),
    }
}

fn add_liquidity(accounts: &[AccountInfo], args: AddLiquidityArgs) -> ProgramResult {
    let [owner, pool_info, lp_mint, vault_a, vault_b, owner_a, owner_b, owner_lp, _mint_a, _mint_b, token_program, ..] =
        accounts
    else {
        return Err(ProgramError::NotEnoughAccountKeys);
    };
    require_signer(owner)?;
    check_deadline(args.deadline)?;

    let mut pool: VenuePool = load(pool_info)?;
    let supply = spl_token::state::Mint::unpack(&lp_mint.try_borrow_data()?)?.supply as u128;
    let (reserve_a, reserve_b) = (pool.reserve_a as u128, pool.reserve_b as u128);
    if reserve_a == 0 || reserve_b == 0 || supply == 0 {
        msg!("venue: pool has no price");
        return Err(ProgramError::Custom(ERR_SLIPPAGE));
    }

    let b_optimal = args.amount_a_desired as u128 * reserve_b / reserve_a;
    let (amount_a, amount_b) = if b_optimal <= args.amount_b_desired as u128 {
        (args.amount_a_desired as u128, b_optimal)
    } else {
        (args.amount_b_desired as u128 * reserve_a / reserve_b, args.amount_b_desired as u128)
    };
    if amount_a < args.amount_a_min as u128 || amount_b < args.amount_b_min as u128 {
        return Err(ProgramError::Custom(ERR_SLIPPAGE));
    }
    let liquidity = (amount_a * supply / reserve_a).min(amount_b * supply / reserve_b) as u64;
    let (amount_a, amount_b) = (amount_a as u64, amount_b as u64);

    transfer(token_program, owner_a, vault_a, owner, amount_a, &[])?;
    transfer(token_program, owner_b, vault_b, owner, amount_b, &[])?;

    let stable = [pool.stable as u8];
    let bump = [pool.bump];
    let pool_seeds: &[&[u8]] = &[
        seeds::POOL_SEED,
        pool.token_mint_a.as_ref(),
        pool.token_mint_b.as_ref(),
        &stable,
        &bump,
    ];
    invoke_signed(
        &spl_token::instruction::mint_to(token_program.key, lp_mint.key, owner_lp.key, pool_info.key, &[], liquidity)?,
        &[lp_mint.clone(), owner_lp.clone(), pool_info.clone(), token_program.clone()],
        &[pool_seeds],
    )?;

    pool.reserve_a += amount_a;
    pool.reserve_b += amount_b;
    store(pool_info, &pool)
}

fn remove_liquidity(accounts: &[AccountInfo], args: RemoveLiquidityArgs) -> ProgramResult {
    let [owner, pool_info, lp_mint, vault_a, vault_b, owner_a, owner_b, owner_lp, _mint_a, _mint_b, token_program, ..] =
        accounts
    else {
        return Err(ProgramError::NotEnoughAccountKeys);
    };
    require_signer(owner)?;
    check_deadline(args.deadline)?;

    let mut pool: VenuePool = load(pool_info)?;
    let supply = spl_token::state::Mint::unpack(&lp_mint.try_borrow_data()?)?.supply as u128;
    if supply == 0 {
        return Err(ProgramError::InsufficientFunds);
    }
    let amount_a = (args.liquidity as u128 * pool.reserve_a as u128 / supply) as u64;
    let amount_b = (args.liquidity as u128 * pool.reserve_b as u128 / supply) as u64;
    if amount_a < args.amount_a_min || amount_b < args.amount_b_min {
        return Err(ProgramError::Custom(ERR_SLIPPAGE));
    }

    invoke_signed(
        &spl_token::instruction::burn(token_program.key, owner_lp.key, lp_mint.key, owner.key, &[], args.liquidity)?,
        &[owner_lp.clone(), lp_mint.clone(), owner.clone(), token_program.clone()],
        &[],
    )?;

    let stable = [pool.stable as u8];
    let bump = [pool.bump];
    let pool_seeds: &[&[u8]] = &[
        seeds::POOL_SEED,
        pool.token_mint_a.as_ref(),
        pool.token_mint_b.as_ref(),
        &stable,
        &bump,
    ];
    transfer(token_program, vault_a, owner_a, pool_info, amount_a, &[pool_seeds])?;
    transfer(token_program, vault_b, owner_b, pool_info, amount_b, &[pool_seeds])?;

    pool.reserve_a -= amount_a;
    pool.reserve_b -= amount_b;
    store(pool_info, &pool)
}

fn gauge_deposit(program_id: &Pubkey, accounts: &[AccountInfo], args: GaugeAmountArgs) -> ProgramResult {
    let [owner, payer, gauge_info, stake_info, owner_lp, gauge_lp_vault, _lp_mint, token_program, system_program, ..] =
        accounts
    else {
        return Err(ProgramError::NotEnoughAccountKeys);
    };
    require_signer(owner)?;

    let mut gauge: VenueGauge = load(gauge_info)?;
    let (stake_key, stake_bump) = Pubkey::find_program_address(
        &[seeds::STAKE_SEED, gauge_info.key.as_ref(), owner.key.as_ref()],
        program_id,
    );
    if stake_key != *stake_info.key {
        return Err(ProgramError::InvalidSeeds);
    }

    if stake_info.data_is_empty() {
        let space = VenueStake::LEN;
        invoke_signed(
            &system_instruction::create_account(
                payer.key,
                stake_info.key,
                Rent::get()?.minimum_balance(space),
                space as u64,
                program_id,
            ),
            &[payer.clone(), stake_info.clone(), system_program.clone()],
            &[&[seeds::STAKE_SEED, gauge_info.key.as_ref(), owner.key.as_ref(), &[stake_bump]]],
        )?;
        store(
            stake_info,
            &VenueStake {
                gauge: *gauge_info.key,
                owner: *owner.key,
                amount: 0,
                bump: stake_bump,
            },
        )?;
    }

    let mut stake: VenueStake = load(stake_info)?;
    transfer(token_program, owner_lp, gauge_lp_vault, owner, args.amount, &[])?;

    stake.amount += args.amount;
    gauge.total_staked += args.amount;
    store(stake_info, &stake)?;
    store(gauge_info, &gauge)
}

fn gauge_withdraw(accounts: &[AccountInfo], args: GaugeAmountArgs) -> ProgramResult {
    let [owner, _payer, gauge_info, stake_info, owner_lp, gauge_lp_vault, _lp_mint, token_program, ..] = accounts
    else {
        return Err(ProgramError::NotEnoughAccountKeys);
    };
    require_signer(owner)?;

    let mut gauge: VenueGauge = load(gauge_info)?;
    let mut stake: VenueStake = load(stake_info)?;
    if stake.owner != *owner.key || stake.amount < args.amount {
        return Err(ProgramError::Custom(ERR_STAKE));
    }

    let bump = [gauge.bump];
    let gauge_seeds: &[&[u8]] = &[seeds::GAUGE_SEED, gauge.pool.as_ref(), &bump];
    transfer(token_program, gauge_lp_vault, owner_lp, gauge_info, args.amount, &[gauge_seeds])?;

    stake.amount -= args.amount;
    gauge.total_staked -= args.amount;
    store(stake_info, &stake)?;
    store(gauge_info, &gauge)
}

fn get_reward(accounts: &[AccountInfo]) -> ProgramResult {
    let [owner, gauge_info, stake_info, reward_vault, recipient, _reward_mint, token_program, ..] = accounts else {
        return Err(ProgramError::NotEnoughAccountKeys);
    };
    require_signer(owner)?;

    let gauge: VenueGauge = load(gauge_info)?;
    let staked = if stake_info.data_is_empty() {
        0
    } else {
        let stake: VenueStake = load(stake_info)?;
        if stake.owner != *owner.key {
            return Err(ProgramError::Custom(ERR_STAKE));
        }
        stake.amount
    };
    if staked == 0 {
        return Ok(());
    }

    let bump = [gauge.bump];
    let gauge_seeds: &[&[u8]] = &[seeds::GAUGE_SEED, gauge.pool.as_ref(), &bump];
    transfer(token_program, reward_vault, recipient, gauge_info, REWARD_PER_CLAIM, &[gauge_seeds])
}

fn transfer<'a>(
    token_program: &AccountInfo<'a>,
    from: &AccountInfo<'a>,
    to: &AccountInfo<'a>,
    authority: &AccountInfo<'a>,
    amount: u64,
    signer_seeds: &[&[&[u8]]],
) -> ProgramResult {
    if amount == 0 {
        return Ok(());
    }
    invoke_signed(
        &spl_token::instruction::transfer(token_program.key, from.key, to.key, authority.key, &[], amount)?,
        &[from.clone(), to.clone(), authority.clone(), token_program.clone()],
        signer_seeds,
    )
}

fn require_signer(info: &AccountInfo) -> ProgramResult {
    if info.is_signer {
        Ok(())
    } else {
        Err(ProgramError::MissingRequiredSignature)
    }
}

fn check_deadline(deadline: i64) -> ProgramResult {
    if Clock::get()?.unix_timestamp > deadline {
        return Err(ProgramError::Custom(ERR_EXPIRED));
    }
    Ok(())
}

fn decode<T: AnchorDeserialize>(mut data: &[u8]) -> Result<T, ProgramError> {
    T::deserialize(&mut data).map_err(|_| ProgramError::InvalidInstructionData)
}

fn load<T: VenueAccountDeserialize>(info: &AccountInfo) -> Result<T, ProgramError> {
    T::try_deserialize(&info.try_borrow_data()?).map_err(|_| ProgramError::InvalidAccountData)
}

fn store<T: VenueAccountDeserialize + AnchorSerialize>(info: &AccountInfo, value: &T) -> ProgramResult {
    let mut data = info.try_borrow_mut_data()?;
    data[..8].copy_from_slice(&T::discriminator());
    let mut body: &mut [u8] = &mut data[8..];
    value
        .serialize(&mut body)
        .map_err(|_| ProgramError::AccountDataTooSmall)
}

/// Account data for a venue-owned account, padded to `len`
pub fn account_data<T: VenueAccountDeserialize + AnchorSerialize>(value: &T, len: usize) -> Vec<u8> {
    let mut data = T::discriminator().to_vec();
    value.serialize(&mut data).expect("serialize venue account");
    data.resize(len, 0);
    data
}
