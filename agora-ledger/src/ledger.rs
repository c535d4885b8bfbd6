// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! The atomic-commit Ledger: owns the UTXO set, the enrollment manager, and
//! the mempool, and mediates every mutation to them through its entry
//! points (§4.7, §5).

use std::collections::BTreeMap;

use agora_blockchain::{merkle_path, Block, Enrollment};
use agora_common::Hash;
use agora_transaction::validation::validate as validate_tx;
use agora_transaction::{utxo_key, Transaction, Utxo};
use tracing::{info, warn};

use crate::consensus::ConsensusData;
use crate::enrollment::EnrollmentManager;
use crate::error::LedgerError;
use crate::storage::BlockStorage;
use crate::utxo_set::{UsedSetFinder, UtxoSet};

/// The Ledger's public entry points (§4.7). `S` is the block store the
/// caller plugs in; everything else (UTXO set, validator set, mempool) is
/// owned exclusively by this type (§9's ownership note) — readers get
/// owned values, never references into interior storage.
pub struct Ledger<S: BlockStorage> {
    storage: S,
    genesis: Block,
    last_block: Block,
    utxo_set: UtxoSet,
    enrollments: EnrollmentManager,
    mempool: BTreeMap<Hash, Transaction>,
    pending_enrollments: BTreeMap<Hash, Enrollment>,
    min_validator_count: usize,
    on_block_accepted: Option<Box<dyn FnMut(&Block, bool) + Send>>,
}

impl<S: BlockStorage> Ledger<S> {
    /// Replays `storage` from height 0, rebuilding the UTXO set from every
    /// block but the validator set only from the last `CYCLE_LENGTH`
    /// blocks (§4.7's last paragraph).
    pub fn open(mut storage: S, genesis: Block, min_validator_count: usize) -> Result<Self, LedgerError> {
        storage.load(&genesis);
        if storage.read_block(0) != genesis {
            return Err(LedgerError::GenesisMismatch);
        }

        let mut blocks = Vec::new();
        let mut height = 0u64;
        while let Some(block) = storage.try_read_block(height) {
            blocks.push(block);
            height += 1;
        }
        let tip_height = blocks.len() as u64 - 1;
        let replay_from = tip_height.saturating_sub(agora_blockchain::CYCLE_LENGTH);

        let mut utxo_set = UtxoSet::new();
        let mut enrollments = EnrollmentManager::new();
        for block in &blocks {
            for tx in &block.txs {
                let spent: Vec<Utxo> = tx
                    .inputs
                    .iter()
                    .filter_map(|input| utxo_set.get(&utxo_key(&input.previous_tx_hash, input.output_index)))
                    .collect();
                utxo_set.apply_transaction(tx, block.header.height, &spent);
            }
            if block.header.height >= replay_from {
                for enrollment in &block.header.enrollments {
                    let utxo = utxo_set.get(&enrollment.utxo_key);
                    let _ = enrollments.add_validator(enrollment.clone(), block.header.height, utxo.as_ref());
                }
            }
        }
        enrollments.clear_expired(tip_height);

        let last_block = blocks.into_iter().last().expect("at least genesis was loaded");
        Ok(Ledger {
            storage,
            genesis,
            last_block,
            utxo_set,
            enrollments,
            mempool: BTreeMap::new(),
            pending_enrollments: BTreeMap::new(),
            min_validator_count,
            on_block_accepted: None,
        })
    }

    /// Register a callback invoked after every successfully accepted block,
    /// with a flag reporting whether the validator set changed (§4.7, §9's
    /// constructor-injected-observer note in place of a global registry).
    pub fn set_on_block_accepted(&mut self, observer: Box<dyn FnMut(&Block, bool) + Send>) {
        self.on_block_accepted = Some(observer);
    }

    /// Validate `block` against the current tip and, on success, apply its
    /// UTXO and validator-set changes atomically: both are mutated on
    /// working clones, and `self`'s fields are only replaced once every
    /// transaction and enrollment in the block has been confirmed valid
    /// (§4.7, §8 property 4). Any rejection leaves `self` byte-for-byte
    /// unchanged.
    pub fn accept_block(&mut self, block: Block) -> bool {
        let parent = if block.header.height == 0 {
            None
        } else {
            self.storage.try_read_block(block.header.height - 1)
        };
        let active_validator_count = self.enrollments.validator_count(block.header.height);
        let used = UsedSetFinder::new(&self.utxo_set);
        let tx_validator = |tx: &Transaction, height: u64| validate_tx(tx, height, &used).is_ok();

        if let Err(e) = agora_blockchain::validation::validate(
            &block,
            parent.as_ref(),
            &self.genesis,
            active_validator_count,
            self.min_validator_count,
            &tx_validator,
        ) {
            warn!(height = block.header.height, error = %e, "rejecting block");
            return false;
        }

        let mut utxo_set = self.utxo_set.clone();
        for tx in &block.txs {
            let spent: Vec<Utxo> = tx
                .inputs
                .iter()
                .filter_map(|input| self.utxo_set.get(&utxo_key(&input.previous_tx_hash, input.output_index)))
                .collect();
            utxo_set.apply_transaction(tx, block.header.height, &spent);
        }

        let mut enrollments = self.enrollments.clone();
        let mut validator_set_changed = false;
        for enrollment in &block.header.enrollments {
            let utxo = self.utxo_set.get(&enrollment.utxo_key);
            if enrollments
                .add_validator(enrollment.clone(), block.header.height, utxo.as_ref())
                .is_err()
            {
                warn!(height = block.header.height, "rejecting block: invalid enrollment");
                return false;
            }
            validator_set_changed = true;
        }
        enrollments.clear_expired(block.header.height);

        for tx in &block.txs {
            self.mempool.remove(&tx.hash());
        }
        for enrollment in &block.header.enrollments {
            self.pending_enrollments.remove(&enrollment.utxo_key);
        }

        self.utxo_set = utxo_set;
        self.enrollments = enrollments;
        self.storage.save_block(block.clone());
        self.last_block = block;

        info!(height = self.last_block.header.height, validator_set_changed, "accepted block");
        if let Some(observer) = &mut self.on_block_accepted {
            observer(&self.last_block, validator_set_changed);
        }
        true
    }

    /// Validate `tx` against the current UTXO view and, on success, insert
    /// it into the mempool keyed by its own hash.
    pub fn accept_transaction(&mut self, tx: Transaction) -> bool {
        let finder = |key: &Hash| self.utxo_set.get(key);
        if validate_tx(&tx, self.get_block_height(), &finder).is_err() {
            return false;
        }
        self.mempool.insert(tx.hash(), tx);
        true
    }

    /// Validate `enrollment` against the current UTXO and validator-set
    /// view, and on success queue it for the next nominated set.
    pub fn submit_enrollment(&mut self, enrollment: Enrollment) -> bool {
        let utxo = self.utxo_set.get(&enrollment.utxo_key);
        let mut probe = self.enrollments.clone();
        if probe
            .add_validator(enrollment.clone(), self.get_block_height(), utxo.as_ref())
            .is_err()
        {
            return false;
        }
        self.pending_enrollments.insert(enrollment.utxo_key, enrollment);
        true
    }

    /// The next candidate block body: up to `max_txs` mempool transactions
    /// (already sorted ascending by hash, since the mempool is keyed by
    /// it) plus every queued enrollment.
    pub fn prepare_nominating_set(&self, max_txs: usize) -> ConsensusData {
        ConsensusData {
            tx_set: self.mempool.values().take(max_txs).cloned().collect(),
            enrolls: self.pending_enrollments.values().cloned().collect(),
        }
    }

    /// Re-validates a candidate `ConsensusData` another node nominated,
    /// without mutating any ledger state.
    pub fn validate_consensus_data(&self, data: &ConsensusData) -> Option<LedgerError> {
        let sorted = data
            .tx_set
            .windows(2)
            .all(|pair| pair[0].hash() <= pair[1].hash());
        if !sorted {
            return Some(LedgerError::TxSetNotSorted);
        }

        let used = UsedSetFinder::new(&self.utxo_set);
        let height = self.get_block_height();
        for tx in &data.tx_set {
            if let Err(e) = validate_tx(tx, height, &used) {
                return Some(LedgerError::from(e));
            }
        }

        let mut probe = self.enrollments.clone();
        for enrollment in &data.enrolls {
            let utxo = self.utxo_set.get(&enrollment.utxo_key);
            if let Err(e) = probe.add_validator(enrollment.clone(), height, utxo.as_ref()) {
                return Some(LedgerError::from(e));
            }
        }
        None
    }

    pub fn get_block_height(&self) -> u64 {
        self.last_block.header.height
    }

    /// Every block from `start_height` to the current tip, inclusive.
    pub fn get_blocks_from(&self, start_height: u64) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut height = start_height;
        while let Some(block) = self.storage.try_read_block(height) {
            blocks.push(block);
            height += 1;
        }
        blocks
    }

    /// The Merkle inclusion path for `tx_hash` within the block at
    /// `height`, or `None` if either does not exist.
    pub fn get_merkle_path(&self, height: u64, tx_hash: Hash) -> Option<Vec<Hash>> {
        let block = self.storage.try_read_block(height)?;
        let leaves: Vec<Hash> = block.txs.iter().map(|tx| tx.hash()).collect();
        let index = leaves.iter().position(|h| *h == tx_hash)?;
        merkle_path(&leaves, index)
    }

    /// The deterministic combination of revealed pre-images from every
    /// validator active at `height`, fed to the quorum builder (§4.6,
    /// §4.8).
    pub fn get_validator_random_seed(&self, height: u64) -> Hash {
        let sorted_keys = self.enrollments.active_utxo_keys(height);
        self.enrollments.get_random_seed(&sorted_keys)
    }

    /// Stake-weighted `(public_key, stake)` pairs for every validator
    /// active at the current tip, for the quorum builder (§4.8).
    pub fn stake_weighted_validators(&self) -> Vec<(agora_crypto::PublicKey, u64)> {
        let stakes: BTreeMap<Hash, u64> = self
            .enrollments
            .get_enrolled_utxos()
            .into_iter()
            .filter_map(|key| self.utxo_set.get(&key).map(|utxo| (key, utxo.output.amount.value())))
            .collect();
        self.enrollments.stake_weighted_validators(&stakes)
    }

    /// Builds this height's quorum slice map directly from the current
    /// validator set, combining [`Ledger::stake_weighted_validators`] and
    /// [`Ledger::get_validator_random_seed`] the way a node feeds its SCP
    /// layer (§4.8), so callers need not reassemble the inputs by hand.
    pub fn build_quorum_slices(&self) -> BTreeMap<agora_crypto::PublicKey, agora_quorum::QuorumSlice> {
        let rand_seed = self.get_validator_random_seed(self.get_block_height());
        agora_quorum::build_quorum_slices(&self.stake_weighted_validators(), rand_seed)
    }

    /// Packages the current mempool into a block at the next height and
    /// accepts it directly, bypassing quorum externalization. Single-node
    /// test and bootstrap shortcut only; real nodes externalize blocks via
    /// the SCP ballot protocol, which this crate does not implement
    /// (§1 Non-goals).
    pub fn force_create_block(&mut self) -> bool {
        use agora_blockchain::Header;
        use agora_crypto::Signature;

        let consensus = self.prepare_nominating_set(agora_blockchain::TXS_PER_BLOCK);
        let leaves: Vec<Hash> = consensus.tx_set.iter().map(|tx| tx.hash()).collect();
        let header = Header {
            prev_block_hash: self.last_block.hash(),
            height: self.get_block_height() + 1,
            merkle_root: agora_blockchain::merkle_root(&leaves),
            validator_bitmask: vec![],
            aggregate_signature: Signature::new([0u8; 32], [0u8; 32]),
            enrollments: consensus.enrolls,
        };
        let block = Block {
            header,
            txs: consensus.tx_set,
        };
        self.accept_block(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_blockchain::Header;
    use agora_common::Amount;
    use agora_crypto::{schnorr_sign, PrivateKey, PublicKey, Signature};
    use agora_transaction::{Input, Lock, Output, TxType, Unlock};
    use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE;
    use curve25519_dalek::scalar::Scalar;

    use crate::storage::MemoryBlockStorage;

    fn key(seed: u8) -> (PrivateKey, PublicKey) {
        let mut bytes = [0u8; 32];
        bytes[0] = seed;
        let sk = PrivateKey::from_scalar(Scalar::from_bytes_mod_order(bytes));
        let pk = sk.public_key();
        (sk, pk)
    }

    fn empty_header(height: u64, prev_hash: Hash) -> Header {
        Header {
            prev_block_hash: prev_hash,
            height,
            merkle_root: agora_blockchain::merkle_root(&[]),
            validator_bitmask: vec![],
            aggregate_signature: Signature::new([0u8; 32], [0u8; 32]),
            enrollments: vec![],
        }
    }

    fn genesis_with_payment(pk: PublicKey) -> Block {
        let coinbase = Transaction {
            tx_type: TxType::Coinbase,
            inputs: vec![Input::zeroed()],
            outputs: vec![Output {
                amount: Amount::new(1_000_000),
                lock: Lock::Key(pk),
            }],
            unlock_height: None,
        };
        let leaves = vec![coinbase.hash()];
        let mut header = empty_header(0, Hash::ZERO);
        header.merkle_root = agora_blockchain::merkle_root(&leaves);
        Block {
            header,
            txs: vec![coinbase],
        }
    }

    /// A genesis block whose single coinbase has `agora_blockchain::TXS_PER_BLOCK`
    /// outputs locked to `pk`, so a caller can spend each output in its own
    /// transaction and fill a block without chaining spends through each other.
    fn genesis_with_spendable_outputs(pk: PublicKey) -> Block {
        let outputs = (0..agora_blockchain::TXS_PER_BLOCK)
            .map(|_| Output {
                amount: Amount::new(100_000),
                lock: Lock::Key(pk),
            })
            .collect();
        let coinbase = Transaction {
            tx_type: TxType::Coinbase,
            inputs: vec![Input::zeroed()],
            outputs,
            unlock_height: None,
        };
        let leaves = vec![coinbase.hash()];
        let mut header = empty_header(0, Hash::ZERO);
        header.merkle_root = agora_blockchain::merkle_root(&leaves);
        Block {
            header,
            txs: vec![coinbase],
        }
    }

    /// Spends `coinbase`'s output at `output_index`, signed by `sk`/`pk`, paying
    /// `amount` back to `pk`.
    fn spend_single_output(
        sk: &PrivateKey,
        pk: PublicKey,
        coinbase_hash: Hash,
        output_index: u32,
        amount: Amount,
    ) -> Transaction {
        let mut tx = Transaction {
            tx_type: TxType::Payment,
            inputs: vec![Input {
                previous_tx_hash: coinbase_hash,
                output_index,
                unlock_age: 0,
                unlock_script: Unlock::default(),
            }],
            outputs: vec![Output {
                amount,
                lock: Lock::Key(pk),
            }],
            unlock_height: None,
        };
        let challenge = agora_transaction::get_challenge(&tx, agora_script::SigHash::All, 0).unwrap();
        let mut nonce_bytes = [0u8; 32];
        nonce_bytes[0] = 9u8 + output_index as u8;
        let nonce = Scalar::from_bytes_mod_order(nonce_bytes);
        let r = &nonce * ED25519_BASEPOINT_TABLE;
        let sig = schnorr_sign(sk.scalar(), &pk, r, nonce, &challenge);
        tx.inputs[0].unlock_script = Unlock(sig.to_bytes().to_vec());
        tx
    }

    fn open_genesis_ledger() -> (Ledger<MemoryBlockStorage>, PrivateKey, PublicKey) {
        let (sk, pk) = key(1);
        let genesis = genesis_with_payment(pk);
        let storage = MemoryBlockStorage::new();
        let ledger = Ledger::open(storage, genesis, 0).unwrap();
        (ledger, sk, pk)
    }

    fn open_genesis_ledger_with_spendable_outputs() -> (Ledger<MemoryBlockStorage>, PrivateKey, PublicKey) {
        let (sk, pk) = key(1);
        let genesis = genesis_with_spendable_outputs(pk);
        let storage = MemoryBlockStorage::new();
        let ledger = Ledger::open(storage, genesis, 0).unwrap();
        (ledger, sk, pk)
    }

    #[test]
    fn open_replays_genesis_only_chain() {
        let (ledger, _, _) = open_genesis_ledger();
        assert_eq!(ledger.get_block_height(), 0);
        assert_eq!(ledger.get_blocks_from(0).len(), 1);
    }

    /// Scenario S2: a block carrying exactly `TXS_PER_BLOCK` transactions is
    /// force-created and the chain height advances to 1.
    #[test]
    fn accept_transaction_then_force_create_block_advances_height() {
        let (mut ledger, sk, pk) = open_genesis_ledger_with_spendable_outputs();
        let coinbase_hash = ledger.last_block.txs[0].hash();

        for output_index in 0..agora_blockchain::TXS_PER_BLOCK as u32 {
            let tx = spend_single_output(&sk, pk, coinbase_hash, output_index, Amount::new(90_000));
            assert!(ledger.accept_transaction(tx));
        }

        assert!(ledger.force_create_block());
        assert_eq!(ledger.get_block_height(), 1);
        assert_eq!(ledger.last_block.txs.len(), agora_blockchain::TXS_PER_BLOCK);
    }

    #[test]
    fn rejecting_a_block_leaves_state_untouched() {
        let (mut ledger, _, _) = open_genesis_ledger();
        let utxo_count_before = ledger.utxo_set.len();

        let mut bad_block = ledger.last_block.clone();
        bad_block.header.height = 5;
        assert!(!ledger.accept_block(bad_block));
        assert_eq!(ledger.get_block_height(), 0);
        assert_eq!(ledger.utxo_set.len(), utxo_count_before);
    }
}
