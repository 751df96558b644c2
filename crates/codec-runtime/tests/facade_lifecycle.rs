// Integration tests driving a real worker thread against the in-process
// `reference` backend. These exercise the concrete scenarios from the
// engine's testable-properties sweep: encode/decode round-trip, force-
// keyframe cadence, non-blocking flush, reset-cancels-flush, and the
// media-resource clone/close lifecycle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use codec_core::{
    AccessOptions, CodecKind, Geometry, MediaFormat, MediaResource, MediaResourceInit, PlaneLayout, Rotation,
    VideoDecoderConfig, VideoEncoderConfig, VideoGeometry, VideoPixelFormat,
};
use codec_runtime::facade::CodecState;
use codec_runtime::message::EncodeOptions;
use codec_runtime::resource_manager::ResourceManager;
use codec_runtime::runtime_config::RuntimeConfig;
use codec_runtime::video_decoder::VideoDecoder;
use codec_runtime::video_encoder::VideoEncoder;

fn rgba_frame(width: u32, height: u32, ts: i64) -> MediaResource {
    let data = vec![7u8; (width * height * 4) as usize];
    MediaResource::new(MediaResourceInit {
        format: MediaFormat::Video(VideoPixelFormat::Rgba),
        geometry: Geometry::Video(VideoGeometry {
            coded_width: width,
            coded_height: height,
            visible_left: 0,
            visible_top: 0,
            visible_width: width,
            visible_height: height,
        }),
        timestamp_micros: ts,
        duration_micros: Some(33_333),
        layout: vec![PlaneLayout { offset: 0, stride: (width * 4) as usize }],
        data,
        rotation: Rotation::Deg0,
        flip: false,
        color_space: None,
    })
    .expect("well-formed test frame")
}

fn pump_until<F: Fn() -> bool>(encoder: &VideoEncoder, decoder: Option<&VideoDecoder>, done: F) {
    for _ in 0..2000 {
        encoder.pump();
        if let Some(d) = decoder {
            d.pump();
        }
        if done() {
            return;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    panic!("condition never became true within deadline");
}

/// `FlushCompletion::wait` blocks until some thread's `pump()` drains the
/// worker's `FlushComplete` event; a test driving everything from one
/// thread has to interleave the pump itself rather than call `wait()`.
fn encoder_wait_flush(encoder: &VideoEncoder, flush: &codec_runtime::facade::FlushCompletion) -> Result<(), codec_core::CodecError> {
    for _ in 0..2000 {
        encoder.pump();
        if let Some(result) = flush.poll() {
            return result;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    panic!("flush never completed within deadline");
}

fn decoder_wait_flush(decoder: &VideoDecoder, flush: &codec_runtime::facade::FlushCompletion) -> Result<(), codec_core::CodecError> {
    for _ in 0..2000 {
        decoder.pump();
        if let Some(result) = flush.poll() {
            return result;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    panic!("flush never completed within deadline");
}

#[test]
fn encode_decode_round_trip_thirty_frames() {
    let decoded_count = Arc::new(Mutex::new(0usize));
    let decoded_count2 = Arc::clone(&decoded_count);
    let decoded_timestamps = Arc::new(Mutex::new(Vec::<i64>::new()));
    let decoded_timestamps2 = Arc::clone(&decoded_timestamps);

    let decoder = VideoDecoder::new(
        RuntimeConfig::default(),
        move |frame, _meta| {
            *decoded_count2.lock().unwrap() += 1;
            decoded_timestamps2.lock().unwrap().push(frame.timestamp_micros().unwrap());
        },
        |err| panic!("decoder error: {err:?}"),
        || {},
    );
    decoder
        .configure(VideoDecoderConfig { codec: "avc1.42001e".into(), coded_width: 320, coded_height: 240, ..Default::default() })
        .unwrap();

    let first_chunk_is_key = Arc::new(Mutex::new(None::<bool>));
    let first_chunk_is_key2 = Arc::clone(&first_chunk_is_key);
    let emitted = Arc::new(Mutex::new(0usize));
    let emitted2 = Arc::clone(&emitted);

    let decoder_for_feed = Arc::new(decoder);
    let decoder_for_feed2 = Arc::clone(&decoder_for_feed);

    let encoder = VideoEncoder::new(
        RuntimeConfig::default(),
        move |chunk, _meta| {
            let mut guard = first_chunk_is_key2.lock().unwrap();
            if guard.is_none() {
                *guard = Some(chunk.chunk_type().unwrap() == codec_core::ChunkType::Key);
            }
            *emitted2.lock().unwrap() += 1;
            decoder_for_feed2.decode(chunk, 0).unwrap();
        },
        |err| panic!("encoder error: {err:?}"),
        || {},
    );
    encoder
        .configure(VideoEncoderConfig {
            codec: "avc1.42001e".into(),
            width: 320,
            height: 240,
            bitrate: Some(1_000_000),
            framerate: Some(30.0),
            ..Default::default()
        })
        .unwrap();

    for i in 0..30i64 {
        encoder.encode(rgba_frame(320, 240, i * 33_333), EncodeOptions { force_keyframe: i == 0 }, i).unwrap();
    }
    let flush = encoder.flush().unwrap();
    encoder_wait_flush(&encoder, &flush).unwrap();

    pump_until(&encoder, Some(&decoder_for_feed), || *decoded_count.lock().unwrap() == 30);
    let decoder_flush = decoder_for_feed.flush().unwrap();
    decoder_wait_flush(&decoder_for_feed, &decoder_flush).unwrap();

    assert!(first_chunk_is_key.lock().unwrap().unwrap());
    assert_eq!(*emitted.lock().unwrap(), 30);
    let timestamps = decoded_timestamps.lock().unwrap();
    assert_eq!(timestamps.len(), 30);
    assert_eq!(timestamps[0], 0);
    assert!(timestamps.windows(2).all(|w| w[1] >= w[0]));
    assert!(*timestamps.last().unwrap() <= 30 * 33_333);
}

#[test]
fn force_keyframe_cadence_places_keys_at_requested_indices() {
    let key_indices = Arc::new(Mutex::new(Vec::<usize>::new()));
    let key_indices2 = Arc::clone(&key_indices);
    let index = Arc::new(Mutex::new(0usize));
    let index2 = Arc::clone(&index);

    let encoder = VideoEncoder::new(
        RuntimeConfig::default(),
        move |chunk, _meta| {
            let i = *index2.lock().unwrap();
            if chunk.chunk_type().unwrap() == codec_core::ChunkType::Key {
                key_indices2.lock().unwrap().push(i);
            }
            *index2.lock().unwrap() += 1;
        },
        |err| panic!("encoder error: {err:?}"),
        || {},
    );
    encoder
        .configure(VideoEncoderConfig { codec: "avc1.42001e".into(), width: 64, height: 64, framerate: Some(30.0), ..Default::default() })
        .unwrap();

    for i in 0..60i64 {
        encoder.encode(rgba_frame(64, 64, i), EncodeOptions { force_keyframe: i % 15 == 0 }, i).unwrap();
    }
    let flush = encoder.flush().unwrap();
    encoder_wait_flush(&encoder, &flush).unwrap();

    let keys = key_indices.lock().unwrap();
    for expected in [0usize, 15, 30, 45] {
        assert!(keys.contains(&expected), "expected a key chunk at index {expected}, got {keys:?}");
    }
}

#[test]
fn reset_cancels_pending_flush_with_aborted() {
    let encoder = VideoEncoder::new(RuntimeConfig::default(), |_c, _m| {}, |_e| {}, || {});
    encoder
        .configure(VideoEncoderConfig { codec: "avc1.42001e".into(), width: 32, height: 32, ..Default::default() })
        .unwrap();
    for i in 0..10i64 {
        encoder.encode(rgba_frame(32, 32, i), EncodeOptions { force_keyframe: i == 0 }, i).unwrap();
    }
    let pending = encoder.flush().unwrap();
    encoder.reset().unwrap();

    let result = pending.wait();
    assert!(matches!(result, Err(codec_core::CodecError::Aborted)));
    assert_eq!(encoder.state(), CodecState::Unconfigured);
    assert_eq!(encoder.encode_queue_size(), 0);
}

#[test]
fn media_resource_lifecycle_clone_then_close_original() {
    let mut original = rgba_frame(64, 64, 0);
    let clone = original.clone_resource().unwrap();
    original.close();

    let mut dst = vec![0u8; 64 * 64 * 4];
    let written = clone.copy_to(&mut dst, AccessOptions::default()).unwrap();
    assert_eq!(written, dst.len());
    assert!(dst.iter().all(|&b| b == 7));
    assert!(matches!(original.copy_to(&mut dst, AccessOptions::default()), Err(codec_core::CodecError::Detached)));
}

#[test]
fn decoded_frame_carries_configured_rotation_and_flip() {
    let metadata = Arc::new(Mutex::new(None::<(Rotation, bool)>));
    let metadata2 = Arc::clone(&metadata);

    let decoder = VideoDecoder::new(
        RuntimeConfig::default(),
        move |frame, _meta| {
            let m = frame.metadata().unwrap();
            *metadata2.lock().unwrap() = Some((m.rotation, m.flip));
        },
        |err| panic!("decoder error: {err:?}"),
        || {},
    );
    decoder
        .configure(VideoDecoderConfig {
            codec: "avc1.42001e".into(),
            coded_width: 16,
            coded_height: 16,
            rotation: Rotation::Deg180,
            flip: true,
            ..Default::default()
        })
        .unwrap();
    let decoder = Arc::new(decoder);
    let decoder_for_feed = Arc::clone(&decoder);

    let encoder = VideoEncoder::new(
        RuntimeConfig::default(),
        move |chunk, _meta| decoder_for_feed.decode(chunk, 0).unwrap(),
        |err| panic!("encoder error: {err:?}"),
        || {},
    );
    encoder
        .configure(VideoEncoderConfig { codec: "avc1.42001e".into(), width: 16, height: 16, ..Default::default() })
        .unwrap();
    encoder.encode(rgba_frame(16, 16, 0), EncodeOptions { force_keyframe: true }, 0).unwrap();

    pump_until(&encoder, Some(&decoder), || metadata.lock().unwrap().is_some());

    let (rotation, flip) = metadata.lock().unwrap().expect("decoder produced an output");
    assert_eq!(rotation, Rotation::Deg180);
    assert!(flip);
}

#[test]
fn unsupported_codec_string_closes_facade_via_error_callback() {
    let error_kind = Arc::new(Mutex::new(None::<codec_core::ErrorKind>));
    let error_kind2 = Arc::clone(&error_kind);
    let decoder = VideoDecoder::new(
        RuntimeConfig::default(),
        |_f, _m| {},
        move |err| *error_kind2.lock().unwrap() = Some(err.kind()),
        || {},
    );
    decoder
        .configure(VideoDecoderConfig { codec: "does.not.exist".into(), coded_width: 16, coded_height: 16, ..Default::default() })
        .unwrap();

    for _ in 0..500 {
        decoder.pump();
        if error_kind.lock().unwrap().is_some() {
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(*error_kind.lock().unwrap(), Some(codec_core::ErrorKind::Unsupported));
    assert_eq!(decoder.state(), CodecState::Closed);
    assert!(matches!(
        decoder.decode(codec_core::EncodedChunk::new(codec_core::ChunkType::Key, 0, None, vec![1]), 0),
        Err(codec_core::CodecError::InvalidState { .. })
    ));
}

#[test]
fn resource_manager_reclaims_idle_facade() {
    let manager = ResourceManager::new();
    let reclaimed = Arc::new(Mutex::new(false));
    let reclaimed2 = Arc::clone(&reclaimed);
    let encoder = VideoEncoder::new(
        RuntimeConfig::default(),
        |_c, _m| {},
        move |err| {
            if matches!(err, codec_core::CodecError::ReclamationError) {
                *reclaimed2.lock().unwrap() = true;
            }
        },
        || {},
    );
    encoder
        .configure(VideoEncoderConfig { codec: "avc1.42001e".into(), width: 16, height: 16, ..Default::default() })
        .unwrap();
    encoder.register_with(&manager, 0);
    assert_eq!(manager.registered_kinds(), vec![CodecKind::VideoEncoder]);

    manager.reclaim_inactive(1_000_000, 100);
    encoder.pump();
    assert!(*reclaimed.lock().unwrap());
    assert_eq!(encoder.state(), CodecState::Closed);
}
