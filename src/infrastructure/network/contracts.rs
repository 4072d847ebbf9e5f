// SPDX-License-Identifier: MIT

//! On-chain read interfaces the scanner consumes. Swap-execution entrypoints
//! live with the settlement layer and are deliberately absent here.

use alloy::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract Erc20 {
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }

    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract UniV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }

    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract UniV2Pair {
        // Reserves are uint112 on-chain; decoding them as uint256 is
        // ABI-compatible and saves a width conversion on every read.
        // token0 is always the numerically smaller address, so orientation
        // is derived locally instead of calling token0()/token1().
        function getReserves() external view returns (uint256 reserve0, uint256 reserve1, uint32 blockTimestampLast);
    }

    /// Solidly-style factory keyed by (tokenA, tokenB, stable).
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract SolidlyFactory {
        function getPool(address tokenA, address tokenB, bool stable) external view returns (address pool);
    }

    /// Solidly-style router; stable-curve hops are quoted on-chain since the
    /// stable invariant is not reproduced locally.
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract SolidlyRouter {
        struct Route {
            address from;
            address to;
            bool stable;
            address factory;
        }
        function getAmountsOut(uint256 amountIn, Route[] memory routes) external view returns (uint256[] memory amounts);
    }

    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract UniV3Quoter {
        function quoteExactInputSingle(address tokenIn, address tokenOut, uint24 fee, uint256 amountIn, uint160 sqrtPriceLimitX96) external returns (uint256 amountOut);
        function quoteExactInput(bytes path, uint256 amountIn) external returns (uint256 amountOut);
    }
}
