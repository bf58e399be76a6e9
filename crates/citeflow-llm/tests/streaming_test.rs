use citeflow_llm::buffer_utils::parse_sse_bytes;
use citeflow_llm::gemini::GeminiChunkParser;
use citeflow_llm::streaming::ChatChunkParser;
use futures::StreamExt;

fn body(parts: Vec<&'static str>) -> impl futures::Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + 'static {
    futures::stream::iter(parts.into_iter().map(|p| Ok(p.as_bytes().to_vec())))
}

#[tokio::test]
async fn test_chat_stream_fragments() {
    let raw = vec![
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"X is \"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Y [\"},\"finish_reason\":null}]}\n",
        "\ndata: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"1].\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    ];

    let fragments: Vec<String> = parse_sse_bytes(body(raw), ChatChunkParser)
        .map(|item| item.unwrap())
        .collect()
        .await;

    assert_eq!(fragments, vec!["X is ", "Y [", "1]."]);
}

#[tokio::test]
async fn test_gemini_stream_fragments() {
    let raw = vec![
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hello \"}],\"role\":\"model\"}}]}\r\n\r\n",
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"world\"}],\"role\":\"model\"},\"finishReason\":\"STOP\"}]}\r\n\r\n",
    ];

    let fragments: Vec<String> = parse_sse_bytes(body(raw), GeminiChunkParser)
        .map(|item| item.unwrap())
        .collect()
        .await;

    assert_eq!(fragments, vec!["Hello ", "world"]);
}

#[tokio::test]
async fn test_mid_stream_error_surfaces_after_fragments() {
    let raw = vec![
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"partial\"},\"finish_reason\":null}]}\n\n",
        "data: {\"error\":{\"message\":\"upstream overloaded\"}}\n\n",
    ];

    let items: Vec<_> = parse_sse_bytes(body(raw), ChatChunkParser).collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap(), "partial");
    assert!(items[1].as_ref().unwrap_err().to_string().contains("overloaded"));
}

#[tokio::test]
async fn test_gemini_mid_stream_error_surfaces_after_fragments() {
    let raw = vec![
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"X is \"}],\"role\":\"model\"}}]}\r\n\r\n",
        "data: {\"error\":{\"code\":500,\"message\":\"An internal error has occurred\",\"status\":\"INTERNAL\"}}\r\n\r\n",
    ];

    let items: Vec<_> = parse_sse_bytes(body(raw), GeminiChunkParser).collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap(), "X is ");
    assert!(items[1].as_ref().unwrap_err().to_string().contains("internal error"));
}
