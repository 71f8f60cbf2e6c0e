// Copyright 2021-2022 Farcaster Devs
//
// This library is free software; you can redistribute it and/or
// modify it under the terms of the GNU Lesser General Public
// License as published by the Free Software Foundation; either
// version 3 of the License, or (at your option) any later version.
//
// This library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU
// Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public
// License along with this library; if not, write to the Free Software
// Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301, USA

//! Partially signed transactions spending the hedged contracts. Every spending transaction is a
//! [`Tx`] wrapping a [`PartiallySignedTransaction`] with a single input, the inner
//! [`SubTransaction`] type decides how the witness is composed when finalizing.

use std::fmt::Debug;
use std::marker::PhantomData;

use bitcoin::blockdata::script::Script;
use bitcoin::blockdata::transaction::{EcdsaSighashType, OutPoint, TxIn, TxOut};
use bitcoin::hashes::hex::{self, FromHex};
use bitcoin::hashes::sha256d::Hash as Sha256dHash;
use bitcoin::secp256k1::ecdsa::Signature;
use bitcoin::secp256k1::PublicKey;
use bitcoin::util::address;
use bitcoin::util::ecdsa::EcdsaSig;
use bitcoin::util::psbt::{self, PartiallySignedTransaction};
use bitcoin::util::sighash;
use bitcoin::{Network, Transaction, Txid};

use thiserror::Error;

use crate::bitcoin::segwitv0::signature_hash;
use crate::consensus::{self, CanonicalBytes};
use crate::script::Preimage;
use crate::transaction::{
    Broadcastable, Chainable, Error as FError, Finalizable, Linkable, TxLabel, Witnessable,
};

/// Errors specific to the Bitcoin implementation, converted into [`FError`] when crossing the
/// transaction traits.
#[derive(Error, Debug)]
pub enum Error {
    /// Multi-input or multi-output transaction is not supported
    #[error("Multi-input or multi-output transaction is not supported")]
    MultiUTXOUnsuported,
    /// Partially signed transaction error
    #[error("Partially signed transaction error: `{0}`")]
    Psbt(#[from] psbt::Error),
    /// Bitcoin address error
    #[error("Bitcoin address error: `{0}`")]
    AddressDecode(#[from] address::Error),
    /// The address or key does not belong to the expected network
    #[error("Network mismatch: found `{0}`, expected `{1}`")]
    NetworkMismatch(Network, Network),
    /// The transaction id of a UTXO is not a valid hex-encoded hash
    #[error("Invalid UTXO reference: `{0}`")]
    InvalidUtxoReference(#[from] hex::Error),
    /// Secp256k1 error
    #[error("Secp256k1 error: `{0}`")]
    Secp256k1(#[from] bitcoin::secp256k1::Error),
    /// Bitcoin script error
    #[error("Bitcoin script error: `{0}`")]
    BitcoinScript(#[from] bitcoin::blockdata::script::Error),
    /// Signature hash computation error
    #[error("Sighash error: `{0}`")]
    Sighash(#[from] sighash::Error),
}

impl From<Error> for FError {
    fn from(e: Error) -> FError {
        FError::new(e)
    }
}

/// A reference to an output with everything needed to spend it: the outpoint, the output itself,
/// and the witness script behind its P2WSH `script_pubkey` if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataOutput {
    pub out_point: OutPoint,
    pub tx_out: TxOut,
    pub script_pubkey: Option<Script>,
}

impl MetadataOutput {
    /// Reference an existing on-chain output by its transaction id in hex (display order) and
    /// output index.
    pub fn from_utxo(
        txid: &str,
        vout: u32,
        tx_out: TxOut,
        witness_script: Option<Script>,
    ) -> Result<Self, Error> {
        let txid = Txid::from_hex(txid)?;
        Ok(Self {
            out_point: OutPoint::new(txid, vout),
            tx_out,
            script_pubkey: witness_script,
        })
    }
}

/// An output already funded on-chain is its own consumable output.
impl Linkable<MetadataOutput> for MetadataOutput {
    fn get_consumable_output(&self) -> Result<MetadataOutput, FError> {
        Ok(self.clone())
    }
}

/// The witness composition of a spending transaction, implemented by the four transaction types.
pub trait SubTransaction: Debug {
    /// The label of the transaction.
    const LABEL: TxLabel;

    /// Compose the final witness from the partial signatures and the secrets stored in the
    /// partial transaction.
    fn finalize(psbt: &mut PartiallySignedTransaction) -> Result<(), FError>;
}

/// A spending transaction of type `T` under construction.
#[derive(Debug, Clone)]
pub struct Tx<T: SubTransaction> {
    pub(crate) psbt: PartiallySignedTransaction,
    pub(crate) _t: PhantomData<T>,
}

impl<T> Tx<T>
where
    T: SubTransaction,
{
    pub(crate) fn from_unsigned_tx(
        unsigned_tx: Transaction,
        prev: MetadataOutput,
    ) -> Result<Self, FError> {
        let mut psbt =
            PartiallySignedTransaction::from_unsigned_tx(unsigned_tx).map_err(Error::from)?;

        // Set the input witness data
        psbt.inputs[0].witness_utxo = Some(prev.tx_out);
        psbt.inputs[0].witness_script = prev.script_pubkey;

        Ok(Tx {
            psbt,
            _t: PhantomData,
        })
    }

    pub fn label(&self) -> TxLabel {
        T::LABEL
    }

    pub fn as_partial(&self) -> &PartiallySignedTransaction {
        &self.psbt
    }

    pub fn as_partial_mut(&mut self) -> &mut PartiallySignedTransaction {
        &mut self.psbt
    }

    pub fn to_partial(self) -> PartiallySignedTransaction {
        self.psbt
    }

    pub fn from_partial(partial: PartiallySignedTransaction) -> Self {
        Self {
            psbt: partial,
            _t: PhantomData,
        }
    }

    /// The transaction id, stable across signing as the witness is not committed.
    pub fn txid(&self) -> Txid {
        self.psbt.unsigned_tx.txid()
    }

    /// Store a secret in the partial transaction, indexed by its `HASH160` commitment, for the
    /// finalizer to place in the witness.
    pub fn add_secret(&mut self, preimage: &Preimage) {
        self.psbt.inputs[0]
            .hash160_preimages
            .insert(preimage.commitment().as_hash(), preimage.as_bytes().to_vec());
    }
}

impl<T> Finalizable for Tx<T>
where
    T: SubTransaction,
{
    fn finalize(&mut self) -> Result<(), FError> {
        T::finalize(&mut self.psbt)
    }
}

impl<T> Broadcastable for Tx<T>
where
    T: SubTransaction,
{
    type Transaction = Transaction;

    fn extract(&self) -> Transaction {
        self.psbt.clone().extract_tx()
    }
}

impl<T> Linkable<MetadataOutput> for Tx<T>
where
    T: SubTransaction,
{
    fn get_consumable_output(&self) -> Result<MetadataOutput, FError> {
        (self.psbt.unsigned_tx.output.len() == 1)
            .then(|| 0)
            .ok_or_else(|| FError::new(Error::MultiUTXOUnsuported))?;

        Ok(MetadataOutput {
            out_point: OutPoint::new(self.psbt.unsigned_tx.txid(), 0),
            tx_out: self.psbt.unsigned_tx.output[0].clone(),
            script_pubkey: self.psbt.outputs[0].witness_script.clone(),
        })
    }
}

impl<T> Chainable<MetadataOutput> for Tx<T>
where
    T: SubTransaction,
{
    fn based_on(&self) -> Result<MetadataOutput, FError> {
        Ok(MetadataOutput {
            out_point: self.psbt.unsigned_tx.input[0].previous_output,
            tx_out: self.psbt.inputs[0]
                .witness_utxo
                .clone()
                .ok_or(FError::MissingUTXO)?,
            script_pubkey: self.psbt.inputs[0].witness_script.clone(),
        })
    }
}

impl<T> Witnessable for Tx<T>
where
    T: SubTransaction,
{
    type Message = Sha256dHash;
    type PublicKey = PublicKey;
    type Signature = Signature;

    fn generate_witness_message(&self) -> Result<Sha256dHash, FError> {
        let txin = TxInRef::new(&self.psbt.unsigned_tx, 0)?;

        let witness_utxo = self.psbt.inputs[0]
            .witness_utxo
            .as_ref()
            .ok_or(FError::MissingUTXO)?;

        let script = self.psbt.inputs[0]
            .witness_script
            .as_ref()
            .ok_or(FError::MissingWitness)?;

        signature_hash(txin, script, witness_utxo.value, EcdsaSighashType::All)
    }

    fn add_witness(&mut self, pubkey: PublicKey, sig: Signature) -> Result<(), FError> {
        self.psbt.inputs[0]
            .partial_sigs
            .insert(bitcoin::PublicKey::new(pubkey), EcdsaSig::sighash_all(sig));
        Ok(())
    }
}

/// A borrowed reference to a transaction input.
#[derive(Debug, Copy, Clone)]
pub struct TxInRef<'a> {
    pub(crate) transaction: &'a Transaction,
    pub(crate) index: usize,
}

impl<'a> TxInRef<'a> {
    /// Constructs a reference to the input with the given index of the given transaction, fails
    /// if the input does not exist.
    pub fn new(transaction: &'a Transaction, index: usize) -> Result<TxInRef<'a>, FError> {
        (transaction.input.len() > index)
            .then(|| TxInRef { transaction, index })
            .ok_or(FError::WrongTemplate("Input index out of range"))
    }

    /// Returns a reference to the borrowed transaction.
    pub fn transaction(&self) -> &Transaction {
        self.transaction
    }

    /// Returns a reference to the input.
    pub fn input(&self) -> &TxIn {
        &self.transaction.input[self.index]
    }

    /// Returns the index of input.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<'a> AsRef<TxIn> for TxInRef<'a> {
    fn as_ref(&self) -> &TxIn {
        self.input()
    }
}

impl CanonicalBytes for Transaction {
    fn as_canonical_bytes(&self) -> Vec<u8> {
        bitcoin::consensus::encode::serialize(self)
    }

    fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, consensus::Error>
    where
        Self: Sized,
    {
        bitcoin::consensus::encode::deserialize(bytes).map_err(consensus::Error::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use bitcoin::blockdata::witness::Witness;

    const TXID: &str = "7e684f73cf2d690987d855da1a8b46efe0d6663145386eac1edaed3433883133";

    fn utxo() -> MetadataOutput {
        MetadataOutput::from_utxo(
            TXID,
            1,
            TxOut {
                value: 200_000,
                script_pubkey: Script::new_op_return(&[]),
            },
            None,
        )
        .unwrap()
    }

    #[derive(Debug)]
    struct Dummy;

    impl SubTransaction for Dummy {
        const LABEL: TxLabel = TxLabel::Claim;

        fn finalize(psbt: &mut PartiallySignedTransaction) -> Result<(), FError> {
            psbt.inputs[0].final_script_witness = Some(Witness::from_vec(vec![vec![0x01]]));
            Ok(())
        }
    }

    fn dummy_tx(prev: MetadataOutput, outputs: usize) -> Tx<Dummy> {
        let unsigned_tx = Transaction {
            version: 2,
            lock_time: 0,
            input: vec![TxIn {
                previous_output: prev.out_point,
                script_sig: Script::default(),
                sequence: 0xffff_ffff,
                witness: Witness::new(),
            }],
            output: vec![
                TxOut {
                    value: 1_000,
                    script_pubkey: Script::new_op_return(&[]),
                };
                outputs
            ],
        };
        Tx::from_unsigned_tx(unsigned_tx, prev).unwrap()
    }

    #[test]
    fn utxo_reference_from_display_hex() {
        let utxo = utxo();
        assert_eq!(utxo.out_point.txid.to_string(), TXID);
        assert_eq!(utxo.out_point.vout, 1);
        let err = MetadataOutput::from_utxo("zz", 0, utxo.tx_out, None).unwrap_err();
        assert!(matches!(err, Error::InvalidUtxoReference(_)));
    }

    #[test]
    fn chain_on_consumable_output() {
        let prev = utxo();
        let first = dummy_tx(prev.clone(), 1);
        assert!(first.is_build_on_top_of(&prev).is_ok());
        assert_eq!(first.label(), TxLabel::Claim);

        let second = dummy_tx(first.get_consumable_output().unwrap(), 1);
        assert!(second.is_build_on_top_of(&first).is_ok());
        assert!(matches!(
            second.is_build_on_top_of(&prev),
            Err(FError::InvalidTransactionChain)
        ));
    }

    #[test]
    fn multi_output_is_not_linkable() {
        let tx = dummy_tx(utxo(), 2);
        assert!(tx.get_consumable_output().is_err());
    }

    #[test]
    fn witness_message_requires_script() {
        let tx = dummy_tx(utxo(), 1);
        assert!(matches!(
            tx.generate_witness_message(),
            Err(FError::MissingWitness)
        ));
    }

    #[test]
    fn finalize_and_extract_sets_witness() {
        let mut tx = dummy_tx(utxo(), 1);
        let txid = tx.txid();
        let final_tx = tx.finalize_and_extract().unwrap();
        assert_eq!(final_tx.input[0].witness.to_vec(), vec![vec![0x01]]);
        assert_eq!(final_tx.txid(), txid);
    }

    #[test]
    fn input_reference_out_of_range() {
        let tx = dummy_tx(utxo(), 1);
        assert!(TxInRef::new(&tx.psbt.unsigned_tx, 0).is_ok());
        assert!(TxInRef::new(&tx.psbt.unsigned_tx, 1).is_err());
    }
}
