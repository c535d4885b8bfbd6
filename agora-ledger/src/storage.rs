// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! The append-only block store the Ledger replays at startup and appends
//! to on every accepted block (§6). Persistence itself is out of scope;
//! this crate only names the contract and ships an in-memory reference
//! implementation for tests.

use agora_blockchain::Block;

/// Single-writer, append-only block storage. The Ledger is the only
/// writer; readers may run concurrently with it (§5).
pub trait BlockStorage {
    /// Initialize storage with `genesis` if empty; if storage already
    /// holds a height-0 block, the caller must check it matches `genesis`
    /// itself (a mismatch is a fatal startup condition, §6).
    fn load(&mut self, genesis: &Block);

    fn save_block(&mut self, block: Block);

    fn read_block(&self, height: u64) -> Block;

    fn read_last_block(&self) -> Block;

    fn try_read_block(&self, height: u64) -> Option<Block>;
}

/// An in-memory [`BlockStorage`] keyed by height, for tests and the
/// single-process reference node.
#[derive(Clone, Debug, Default)]
pub struct MemoryBlockStorage {
    blocks: Vec<Block>,
}

impl MemoryBlockStorage {
    pub fn new() -> Self {
        MemoryBlockStorage::default()
    }
}

impl BlockStorage for MemoryBlockStorage {
    fn load(&mut self, genesis: &Block) {
        if self.blocks.is_empty() {
            self.blocks.push(genesis.clone());
        }
    }

    fn save_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    fn read_block(&self, height: u64) -> Block {
        self.blocks[height as usize].clone()
    }

    fn read_last_block(&self) -> Block {
        self.blocks.last().expect("load() was called first").clone()
    }

    fn try_read_block(&self, height: u64) -> Option<Block> {
        self.blocks.get(height as usize).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_blockchain::Header;
    use agora_common::Hash;
    use agora_crypto::Signature;

    fn block(height: u64) -> Block {
        Block {
            header: Header {
                prev_block_hash: Hash::ZERO,
                height,
                merkle_root: agora_blockchain::merkle_root(&[]),
                validator_bitmask: vec![],
                aggregate_signature: Signature::new([0u8; 32], [0u8; 32]),
                enrollments: vec![],
            },
            txs: vec![],
        }
    }

    #[test]
    fn load_only_seeds_genesis_once() {
        let genesis = block(0);
        let mut storage = MemoryBlockStorage::new();
        storage.load(&genesis);
        storage.load(&genesis);
        assert_eq!(storage.read_last_block().header.height, 0);
        assert!(storage.try_read_block(1).is_none());
    }

    #[test]
    fn save_block_appends_and_reads_back() {
        let mut storage = MemoryBlockStorage::new();
        storage.load(&block(0));
        storage.save_block(block(1));
        assert_eq!(storage.read_block(1).header.height, 1);
        assert_eq!(storage.read_last_block().header.height, 1);
    }
}
