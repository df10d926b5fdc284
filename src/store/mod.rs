pub mod audio_cache;
