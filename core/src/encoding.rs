// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Encoding related utils.

use std::collections::HashMap;

use crate::Error;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;

/// Base64 encode
pub fn base64_encode(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// Base64 decode
pub fn base64_decode(content: &str) -> crate::Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(content)
        .map_err(|e| Error::unexpected("base64 decode failed").with_source(e))
}

/// Block id for the `index`-th block of a chunked blob upload.
///
/// All block ids of a blob must have the same length, so the index is
/// zero-padded before encoding.
pub fn block_id(index: usize) -> String {
    base64_encode(format!("{index:032}").as_bytes())
}

/// Encode Data Lake properties as `k1=base64(v1),k2=base64(v2)`, sorted by key.
pub fn encode_properties(properties: &HashMap<String, String>) -> String {
    let mut pairs: Vec<(&String, &String)> = properties.iter().collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={}", base64_encode(v.as_bytes())))
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode the `x-ms-properties` header.
pub fn decode_properties(input: &str) -> crate::Result<HashMap<String, String>> {
    input
        .split(',')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| {
            // base64 padding also uses `=`, so split on the first one only
            let (k, v) = pair.trim().split_once('=').ok_or_else(|| {
                Error::unexpected(format!("invalid property {pair:?}, expected `key=value`"))
            })?;
            let v = String::from_utf8(base64_decode(v)?)?;
            Ok((k.to_string(), v))
        })
        .collect()
}
