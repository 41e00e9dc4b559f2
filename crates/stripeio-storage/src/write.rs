//! Erasure-coded part write path
//!
//! Streams a part block by block: each block is split into data and parity
//! shards, fanned out to every endpoint in parallel, and hashed per shard.
//! A stripe is durable once at least `write_quorum` endpoint appends
//! succeed; the recorded SHA-512 digests travel with each endpoint's
//! descriptor so shards can later be verified and unshuffled.

use crate::endpoint::EndpointSlot;
use bytes::Bytes;
use futures::future::join_all;
use std::sync::Arc;
use stripeio_common::{ChecksumEntry, ErasureDescriptor, Error, Result, ShardHashes};
use stripeio_erasure::BlockCodec;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

/// Pick the descriptor that seeds the write geometry
///
/// All valid descriptors in a set agree on geometry, so the first one in
/// positional order wins; no consensus step is needed on the hot path.
fn pick_valid_descriptor(descriptors: &[ErasureDescriptor]) -> Option<&ErasureDescriptor> {
    descriptors.iter().find(|descriptor| descriptor.is_valid())
}

/// Fill `buf` from `stream`, stopping early only at end of stream
///
/// Returns the number of bytes read: `buf.len()` for a full block, a
/// smaller non-zero count for the final partial block, and 0 once the
/// stream is exhausted.
async fn read_full<R>(stream: &mut R, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = stream.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Append one stripe to every present endpoint in parallel
///
/// Endpoint `index` receives shard `distribution[index] - 1`; its hash
/// state travels into the append future and is advanced only after the
/// append succeeds, so a failed append leaves that shard's digest
/// untouched. Absent endpoints count as failed appends. Individual
/// failures are logged, never surfaced; the stripe's only verdict is the
/// quorum predicate.
async fn write_stripe(
    endpoints: &[EndpointSlot],
    volume: &str,
    path: &str,
    shards: &[Bytes],
    distribution: &[usize],
    hashes: &mut ShardHashes,
    write_quorum: usize,
) -> Result<()> {
    let mut appends = Vec::with_capacity(endpoints.len());
    for (index, slot) in endpoints.iter().enumerate() {
        let Some(endpoint) = slot else { continue };
        let endpoint = Arc::clone(endpoint);
        let shard_index = distribution[index] - 1;
        let shard = shards[shard_index].clone();
        let mut hasher = hashes.detach(shard_index);
        appends.push(async move {
            let outcome = endpoint.append(volume, path, &shard).await;
            if outcome.is_ok() {
                hasher.update(&shard);
            }
            (index, shard_index, hasher, outcome)
        });
    }

    let absent = endpoints.len() - appends.len();
    let outcomes = join_all(appends).await;

    let mut failed = absent;
    for (index, shard_index, hasher, outcome) in outcomes {
        hashes.attach(shard_index, hasher);
        if let Err(err) = outcome {
            warn!(endpoint = index, %volume, %path, error = %err, "shard append failed");
            failed += 1;
        }
    }

    if endpoints.len() - failed < write_quorum {
        return Err(Error::WriteQuorumLost {
            volume: volume.to_string(),
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Merge the accumulated shard digests into the output descriptor set
///
/// Endpoint `index` records the digest of shard `distribution[index] - 1`.
/// Only endpoints that are present and carried a valid input descriptor
/// produce an output descriptor; the rest stay holes.
fn finalize_descriptors(
    part_name: &str,
    endpoints: &[EndpointSlot],
    descriptors: &[ErasureDescriptor],
    hashes: &ShardHashes,
) -> Vec<Option<ErasureDescriptor>> {
    descriptors
        .iter()
        .enumerate()
        .map(|(index, descriptor)| {
            if !descriptor.is_valid() || endpoints[index].is_none() {
                return None;
            }
            let shard_index = descriptor.distribution[index] - 1;
            let mut updated = descriptor.clone();
            updated
                .checksums
                .push(ChecksumEntry::sha512(part_name, hashes.digest_hex(shard_index)));
            Some(updated)
        })
        .collect()
}

/// Write one object part across `endpoints`
///
/// The stream is consumed block by block per the first valid descriptor's
/// geometry; every valid descriptor must agree on that geometry. Returns
/// the updated descriptor set (holes for invalid or absent inputs) and
/// the total number of bytes consumed.
///
/// All errors are fatal to the write and returned immediately; partial
/// shard files left behind on endpoints are the caller's to clean up.
pub async fn create_part<R>(
    endpoints: &[EndpointSlot],
    volume: &str,
    path: &str,
    part_name: &str,
    stream: &mut R,
    descriptors: &[ErasureDescriptor],
    write_quorum: usize,
) -> Result<(Vec<Option<ErasureDescriptor>>, u64)>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let geometry = pick_valid_descriptor(descriptors)
        .ok_or(Error::GeometryUnavailable)?
        .clone();
    let codec = BlockCodec::new(geometry.data_shards, geometry.parity_shards)?;

    let mut hashes = ShardHashes::new(geometry.total_shards());
    let mut buf = vec![0u8; geometry.block_size];
    let mut size: u64 = 0;

    loop {
        let n = read_full(stream, &mut buf)
            .await
            .map_err(Error::StreamRead)?;
        if n == 0 {
            if size == 0 {
                // A zero-byte part still materializes a file on every
                // endpoint; readers rely on existence to tell an empty
                // part from a missing one.
                let empty = vec![Bytes::new(); geometry.total_shards()];
                write_stripe(
                    endpoints,
                    volume,
                    path,
                    &empty,
                    &geometry.distribution,
                    &mut hashes,
                    write_quorum,
                )
                .await?;
            }
            break;
        }

        size += n as u64;
        let shards = codec.encode(&buf[..n])?;
        write_stripe(
            endpoints,
            volume,
            path,
            &shards,
            &geometry.distribution,
            &mut hashes,
            write_quorum,
        )
        .await?;
        debug!(%volume, %path, stripe_bytes = n, total_bytes = size, "stripe written");

        if n < buf.len() {
            // A short read is the final block; the stream is exhausted
            // and the short stripe already extended every file.
            break;
        }
    }

    Ok((
        finalize_descriptors(part_name, endpoints, descriptors, &hashes),
        size,
    ))
}
